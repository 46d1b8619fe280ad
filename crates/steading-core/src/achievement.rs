//! Achievement definitions and per-user unlock records.
//!
//! Definitions are static and compiled into the binary (see
//! [`crate::catalog`]). Only the unlock record is persisted, keyed by the
//! definition's stable string id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::action::ActionCounts;

// ─── Tier ────────────────────────────────────────────────────────────────────

/// Presentation rank of an achievement.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
  Bronze,
  Silver,
  Gold,
  Platinum,
}

// ─── Unlock condition ────────────────────────────────────────────────────────

/// The single condition that unlocks an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockCondition {
  /// Unlocked once the user's total XP reaches `threshold`.
  Xp { threshold: u64 },
  /// Unlocked once the event log holds `count` events for `action`.
  Actions { action: &'static str, count: u64 },
}

impl UnlockCondition {
  /// Whether the condition holds for the given totals. A missing action key
  /// counts as zero.
  pub fn is_met(&self, total_xp: u64, counts: &ActionCounts) -> bool {
    match *self {
      Self::Xp { threshold } => total_xp >= threshold,
      Self::Actions { action, count } => {
        counts.get(action).copied().unwrap_or(0) >= count
      }
    }
  }
}

// ─── Definition ──────────────────────────────────────────────────────────────

/// A catalog entry. `id` is stable across releases and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDefinition {
  pub id:          &'static str,
  pub name:        &'static str,
  pub description: &'static str,
  pub icon:        &'static str,
  pub tier:        Tier,
  pub condition:   UnlockCondition,
}

impl AchievementDefinition {
  pub const fn xp(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    tier: Tier,
    threshold: u64,
  ) -> Self {
    Self {
      id,
      name,
      description,
      icon,
      tier,
      condition: UnlockCondition::Xp { threshold },
    }
  }

  pub const fn actions(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    tier: Tier,
    action: &'static str,
    count: u64,
  ) -> Self {
    Self {
      id,
      name,
      description,
      icon,
      tier,
      condition: UnlockCondition::Actions { action, count },
    }
  }

  pub fn qualifies(&self, total_xp: u64, counts: &ActionCounts) -> bool {
    self.condition.is_met(total_xp, counts)
  }

  /// The flat external representation.
  pub fn view(&self) -> AchievementView {
    let (xp_threshold, action_type, action_count) = match self.condition {
      UnlockCondition::Xp { threshold } => (Some(threshold), None, None),
      UnlockCondition::Actions { action, count } => {
        (None, Some(action.to_owned()), Some(count))
      }
    };
    AchievementView {
      id: self.id.to_owned(),
      name: self.name.to_owned(),
      description: self.description.to_owned(),
      icon: self.icon.to_owned(),
      tier: self.tier,
      xp_threshold,
      action_type,
      action_count,
    }
  }
}

/// JSON shape of a definition. Exactly one of `xp_threshold` or the
/// `action_type`/`action_count` pair is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementView {
  pub id:           String,
  pub name:         String,
  pub description:  String,
  pub icon:         String,
  pub tier:         Tier,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub xp_threshold: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub action_type:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub action_count: Option<u64>,
}

impl AchievementView {
  /// `true` when exactly one condition kind is populated.
  pub fn has_single_condition(&self) -> bool {
    let xp = self.xp_threshold.is_some();
    let action = self.action_type.is_some() && self.action_count.is_some();
    let partial_action = self.action_type.is_some() != self.action_count.is_some();
    !partial_action && (xp != action)
  }
}

// ─── Unlock records ──────────────────────────────────────────────────────────

/// The `user_achievements` row. At most one exists per
/// `(user_id, achievement_id)`; it is never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievement {
  pub unlock_id:      Uuid,
  pub user_id:        Uuid,
  pub achievement_id: String,
  pub unlocked_at:    DateTime<Utc>,
}

/// An unlock record joined with its catalog definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockedAchievement {
  #[serde(flatten)]
  pub achievement: AchievementView,
  pub unlocked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use super::*;

  fn counts(pairs: &[(&str, u64)]) -> ActionCounts {
    pairs.iter().map(|(a, n)| ((*a).to_owned(), *n)).collect()
  }

  #[test]
  fn xp_threshold_boundary() {
    let c = UnlockCondition::Xp { threshold: 100 };
    assert!(!c.is_met(99, &ActionCounts::new()));
    assert!(c.is_met(100, &ActionCounts::new()));
    assert!(c.is_met(101, &ActionCounts::new()));
  }

  #[test]
  fn action_count_boundary() {
    let c = UnlockCondition::Actions { action: "task_completed", count: 10 };
    assert!(!c.is_met(0, &counts(&[("task_completed", 9)])));
    assert!(c.is_met(0, &counts(&[("task_completed", 10)])));
  }

  #[test]
  fn missing_action_counts_as_zero() {
    let c = UnlockCondition::Actions { action: "animal_added", count: 1 };
    assert!(!c.is_met(10_000, &counts(&[("task_completed", 50)])));
  }

  #[test]
  fn view_is_flat_and_single_conditioned() {
    let def = AchievementDefinition::actions(
      "x", "X", "desc", "*", Tier::Gold, "goal_completed", 3,
    );
    let v = def.view();
    assert_eq!(v.action_type.as_deref(), Some("goal_completed"));
    assert_eq!(v.action_count, Some(3));
    assert_eq!(v.xp_threshold, None);
    assert!(v.has_single_condition());

    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(json["tier"], "gold");
    assert!(json.get("xp_threshold").is_none());
  }

  #[test]
  fn malformed_views_are_rejected() {
    let mut v = AchievementDefinition::xp("y", "Y", "d", "*", Tier::Bronze, 5).view();
    assert!(v.has_single_condition());
    v.action_type = Some("task_completed".into());
    assert!(!v.has_single_condition());
    v.action_count = Some(1);
    assert!(!v.has_single_condition());
    v.xp_threshold = None;
    assert!(v.has_single_condition());
    v.action_type = None;
    v.action_count = None;
    assert!(!v.has_single_condition());
  }

  #[test]
  fn tier_string_forms() {
    assert_eq!(Tier::Platinum.to_string(), "platinum");
    assert_eq!(Tier::from_str("silver").unwrap(), Tier::Silver);
    assert!(Tier::from_str("wood").is_err());
  }
}
