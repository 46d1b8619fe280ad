//! The progression engine: XP ledger, action counter, achievement evaluator
//! and unlock notification.
//!
//! Generic over any [`steading_core::store::ProgressStore`] and
//! [`steading_core::identity::Identity`]. Nothing here fails outward: store
//! errors are logged and the public operations fall back to safe defaults.

pub mod notify;
pub mod progression;

pub use notify::{ChannelSink, DefaultSink, NotificationSink, Notifier, Toast};
pub use progression::{AwardHandle, AwardOutcome, Progression};
