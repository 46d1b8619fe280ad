//! Per-user XP totals and the level curve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// XP needed to advance one level. The curve is linear.
pub const XP_PER_LEVEL: u64 = 100;

/// The level reached at `total_xp`: `floor(total_xp / 100) + 1`.
///
/// Pure function of the total; there is no hysteresis or decay.
pub const fn level_for_xp(total_xp: u64) -> u64 {
  total_xp / XP_PER_LEVEL + 1
}

/// XP earned inside the current level and XP still missing for the next one.
pub const fn xp_to_next_level(total_xp: u64) -> (u64, u64) {
  let into = total_xp % XP_PER_LEVEL;
  (into, XP_PER_LEVEL - into)
}

/// The `user_stats` row: a cache of the event-log sum for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
  pub user_id:    Uuid,
  pub total_xp:   u64,
  pub level:      u64,
  pub updated_at: DateTime<Utc>,
}

impl UserStats {
  /// Build a stats row whose level is derived from `total_xp`.
  pub fn from_total(user_id: Uuid, total_xp: u64) -> Self {
    Self {
      user_id,
      total_xp,
      level: level_for_xp(total_xp),
      updated_at: Utc::now(),
    }
  }
}

/// The presentation read of a user's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
  pub total_xp: u64,
  pub level:    u64,
}

impl Default for StatsSummary {
  fn default() -> Self { Self { total_xp: 0, level: 1 } }
}

impl From<&UserStats> for StatsSummary {
  fn from(s: &UserStats) -> Self {
    Self { total_xp: s.total_xp, level: s.level }
  }
}
