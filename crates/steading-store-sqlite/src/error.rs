//! Error type for `steading-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] steading_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored integer does not fit the domain type (negative or too large).
  #[error("value out of range for {column}: {value}")]
  OutOfRange { column: &'static str, value: String },

  /// The `(user_id, achievement_id)` uniqueness constraint rejected an insert.
  #[error("achievement {achievement_id:?} already unlocked for user {user_id}")]
  AlreadyUnlocked {
    user_id:        uuid::Uuid,
    achievement_id: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
