//! Route handlers, one module per resource.

pub mod achievements;
pub mod stats;
pub mod xp;
