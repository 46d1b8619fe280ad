//! XP events — the append-only log every other progression value derives from.
//!
//! An event is created for every XP-earning action and is never updated or
//! deleted. Action counts are computed from this log alone; user stats are a
//! cache over it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Free-form context attached to an event by the feature that awarded it
/// (e.g. the id of the completed task).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// An immutable record of XP earned for one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpEvent {
  pub event_id:   Uuid,
  pub user_id:    Uuid,
  pub action:     String,
  pub xp:         u32,
  pub metadata:   Option<Metadata>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
}

impl XpEvent {
  /// Serialise the metadata for the `metadata` database column.
  pub fn metadata_json(&self) -> Result<Option<String>> {
    self
      .metadata
      .as_ref()
      .map(serde_json::to_string)
      .transpose()
      .map_err(Into::into)
  }
}

/// Input to [`crate::store::ProgressStore::append_xp_event`].
/// `event_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewXpEvent {
  pub user_id:  Uuid,
  pub action:   String,
  pub xp:       u32,
  pub metadata: Option<Metadata>,
}

impl NewXpEvent {
  pub fn new(user_id: Uuid, action: impl Into<String>, xp: u32) -> Self {
    Self { user_id, action: action.into(), xp, metadata: None }
  }

  pub fn with_metadata(mut self, metadata: Option<Metadata>) -> Self {
    self.metadata = metadata;
    self
  }
}
