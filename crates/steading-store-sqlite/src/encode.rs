//! Encoding and decoding helpers between Rust domain types and the plain-text
//! and integer representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, and
//! event metadata compact JSON. XP values are stored as SQLite integers.

use chrono::{DateTime, Utc};
use steading_core::{
  achievement::UserAchievement,
  event::{Metadata, XpEvent},
  stats::UserStats,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Integers ────────────────────────────────────────────────────────────────

pub fn encode_u64(column: &'static str, v: u64) -> Result<i64> {
  i64::try_from(v).map_err(|_| Error::OutOfRange {
    column,
    value: v.to_string(),
  })
}

fn decode_int<T: TryFrom<i64>>(column: &'static str, v: i64) -> Result<T> {
  T::try_from(v).map_err(|_| Error::OutOfRange {
    column,
    value: v.to_string(),
  })
}

// ─── Metadata ────────────────────────────────────────────────────────────────

pub fn decode_metadata(s: &str) -> Result<Metadata> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `xp_events` row.
pub struct RawXpEvent {
  pub id:         String,
  pub user_id:    String,
  pub action:     String,
  pub xp:         i64,
  pub metadata:   Option<String>,
  pub created_at: String,
}

impl RawXpEvent {
  pub fn into_event(self) -> Result<XpEvent> {
    Ok(XpEvent {
      event_id:   decode_uuid(&self.id)?,
      user_id:    decode_uuid(&self.user_id)?,
      action:     self.action,
      xp:         decode_int("xp_events.xp", self.xp)?,
      metadata:   self.metadata.as_deref().map(decode_metadata).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `user_stats` row.
pub struct RawUserStats {
  pub user_id:    String,
  pub total_xp:   i64,
  pub level:      i64,
  pub updated_at: String,
}

impl RawUserStats {
  pub fn into_stats(self) -> Result<UserStats> {
    Ok(UserStats {
      user_id:    decode_uuid(&self.user_id)?,
      total_xp:   decode_int("user_stats.total_xp", self.total_xp)?,
      level:      decode_int("user_stats.level", self.level)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `user_achievements` row.
pub struct RawUserAchievement {
  pub id:             String,
  pub user_id:        String,
  pub achievement_id: String,
  pub unlocked_at:    String,
}

impl RawUserAchievement {
  pub fn into_unlock(self) -> Result<UserAchievement> {
    Ok(UserAchievement {
      unlock_id:      decode_uuid(&self.id)?,
      user_id:        decode_uuid(&self.user_id)?,
      achievement_id: self.achievement_id,
      unlocked_at:    decode_dt(&self.unlocked_at)?,
    })
  }
}
