//! Core types and trait definitions for the Steading progression subsystem.
//!
//! No HTTP, database or runtime dependencies. The engine, the storage
//! backends and the API all build on it.

pub mod achievement;
pub mod action;
pub mod catalog;
pub mod error;
pub mod event;
pub mod identity;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
