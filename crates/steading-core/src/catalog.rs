//! The static achievement catalog.
//!
//! Order matters: the evaluator walks the catalog front to back, so unlocks
//! found in one pass are reported in this order. Append new entries; never
//! rename or reuse an `id`, since stored unlock rows reference it.

use std::collections::HashSet;

use crate::{
  Error, Result,
  achievement::{AchievementDefinition as Def, Tier},
  action::{self, ActionCounts},
};

pub static CATALOG: &[Def] = &[
  // ── Tasks ───────────────────────────────────────────────────────────────
  Def::actions(
    "first_task",
    "First Chore Done",
    "Complete your first task.",
    "✅",
    Tier::Bronze,
    action::TASK_COMPLETED,
    1,
  ),
  Def::actions(
    "task_hand",
    "Farm Hand",
    "Complete 10 tasks.",
    "🧑‍🌾",
    Tier::Silver,
    action::TASK_COMPLETED,
    10,
  ),
  Def::actions(
    "task_foreman",
    "Foreman",
    "Complete 100 tasks.",
    "📋",
    Tier::Gold,
    action::TASK_COMPLETED,
    100,
  ),
  // ── Animals ─────────────────────────────────────────────────────────────
  Def::actions(
    "first_animal",
    "New Arrival",
    "Add your first animal.",
    "🐣",
    Tier::Bronze,
    action::ANIMAL_ADDED,
    1,
  ),
  Def::actions(
    "herd_builder",
    "Herd Builder",
    "Add 25 animals.",
    "🐄",
    Tier::Silver,
    action::ANIMAL_ADDED,
    25,
  ),
  Def::actions(
    "first_breeding",
    "Matchmaker",
    "Record your first breeding event.",
    "💞",
    Tier::Bronze,
    action::BREEDING_EVENT_RECORDED,
    1,
  ),
  // ── Records ─────────────────────────────────────────────────────────────
  Def::actions(
    "first_journal",
    "Dear Diary",
    "Write your first journal entry.",
    "📓",
    Tier::Bronze,
    action::JOURNAL_ENTRY_CREATED,
    1,
  ),
  Def::actions(
    "chronicler",
    "Chronicler",
    "Write 30 journal entries.",
    "📚",
    Tier::Silver,
    action::JOURNAL_ENTRY_CREATED,
    30,
  ),
  Def::actions(
    "bookkeeper",
    "Bookkeeper",
    "Record 50 transactions.",
    "💰",
    Tier::Silver,
    action::TRANSACTION_RECORDED,
    50,
  ),
  Def::actions(
    "stocked_pantry",
    "Stocked Pantry",
    "Add 20 inventory items.",
    "🧺",
    Tier::Bronze,
    action::INVENTORY_ITEM_ADDED,
    20,
  ),
  // ── Goals & projects ────────────────────────────────────────────────────
  Def::actions(
    "goal_getter",
    "Goal Getter",
    "Complete your first goal.",
    "🎯",
    Tier::Silver,
    action::GOAL_COMPLETED,
    1,
  ),
  Def::actions(
    "builder",
    "Builder",
    "Finish 5 infrastructure projects.",
    "🛠️",
    Tier::Gold,
    action::PROJECT_COMPLETED,
    5,
  ),
  // ── XP milestones ───────────────────────────────────────────────────────
  Def::xp(
    "greenhorn",
    "Greenhorn",
    "Earn 100 XP.",
    "🌱",
    Tier::Bronze,
    100,
  ),
  Def::xp(
    "homesteader",
    "Homesteader",
    "Earn 500 XP.",
    "🏡",
    Tier::Silver,
    500,
  ),
  Def::xp(
    "steward",
    "Seasoned Steward",
    "Earn 2,500 XP.",
    "🌾",
    Tier::Gold,
    2_500,
  ),
  Def::xp(
    "legend_of_the_land",
    "Legend of the Land",
    "Earn 10,000 XP.",
    "🏆",
    Tier::Platinum,
    10_000,
  ),
];

/// Look up a definition by id.
pub fn get(id: &str) -> Option<&'static Def> {
  CATALOG.iter().find(|d| d.id == id)
}

/// Like [`get`], but an unknown id is an error.
pub fn require(id: &str) -> Result<&'static Def> {
  get(id).ok_or_else(|| Error::UnknownAchievement(id.to_owned()))
}

/// Definitions that are not in `unlocked` and whose condition now holds, in
/// catalog order.
pub fn pending(
  total_xp: u64,
  counts: &ActionCounts,
  unlocked: &HashSet<String>,
) -> Vec<&'static Def> {
  CATALOG
    .iter()
    .filter(|d| !unlocked.contains(d.id))
    .filter(|d| d.qualifies(total_xp, counts))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::achievement::UnlockCondition;

  #[test]
  fn every_definition_has_exactly_one_condition() {
    for def in CATALOG {
      assert!(def.view().has_single_condition(), "{} is malformed", def.id);
      match def.condition {
        UnlockCondition::Xp { threshold } => assert!(threshold > 0, "{}", def.id),
        UnlockCondition::Actions { action, count } => {
          assert!(!action.is_empty(), "{}", def.id);
          assert!(count > 0, "{}", def.id);
        }
      }
    }
  }

  #[test]
  fn ids_are_unique() {
    let mut seen = HashSet::new();
    for def in CATALOG {
      assert!(seen.insert(def.id), "duplicate id {}", def.id);
    }
  }

  #[test]
  fn lookup() {
    assert_eq!(get("first_task").map(|d| d.tier), Some(Tier::Bronze));
    assert!(get("nope").is_none());
    assert!(matches!(require("nope"), Err(Error::UnknownAchievement(id)) if id == "nope"));
  }

  #[test]
  fn pending_respects_thresholds_and_unlocked_set() {
    let mut counts = ActionCounts::new();
    counts.insert(action::TASK_COMPLETED.into(), 9);

    let ids: Vec<_> = pending(99, &counts, &HashSet::new())
      .iter()
      .map(|d| d.id)
      .collect();
    assert_eq!(ids, vec!["first_task"]);

    counts.insert(action::TASK_COMPLETED.into(), 10);
    let ids: Vec<_> = pending(100, &counts, &HashSet::new())
      .iter()
      .map(|d| d.id)
      .collect();
    assert_eq!(ids, vec!["first_task", "task_hand", "greenhorn"]);

    let unlocked: HashSet<String> =
      ["first_task".to_owned(), "greenhorn".to_owned()].into();
    let ids: Vec<_> = pending(100, &counts, &unlocked).iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["task_hand"]);
  }

  #[test]
  fn nothing_pending_for_a_fresh_user() {
    assert!(pending(0, &ActionCounts::new(), &HashSet::new()).is_empty());
  }
}
