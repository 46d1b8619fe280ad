//! The XP-earning actions of the homestead application and how they are
//! counted.
//!
//! Action names are free-form strings in the event log; the constants here
//! are the ones the feature modules emit. Unknown names are still valid.

use std::collections::BTreeMap;

use crate::event::XpEvent;

pub const TASK_COMPLETED: &str = "task_completed";
pub const ANIMAL_ADDED: &str = "animal_added";
pub const JOURNAL_ENTRY_CREATED: &str = "journal_entry_created";
pub const TRANSACTION_RECORDED: &str = "transaction_recorded";
pub const INVENTORY_ITEM_ADDED: &str = "inventory_item_added";
pub const GOAL_COMPLETED: &str = "goal_completed";
pub const BREEDING_EVENT_RECORDED: &str = "breeding_event_recorded";
pub const PROJECT_COMPLETED: &str = "project_completed";

/// Default XP reward per known action, in the order features were added.
pub static XP_REWARDS: &[(&str, u32)] = &[
  (TASK_COMPLETED, 10),
  (ANIMAL_ADDED, 15),
  (JOURNAL_ENTRY_CREATED, 5),
  (TRANSACTION_RECORDED, 5),
  (INVENTORY_ITEM_ADDED, 5),
  (GOAL_COMPLETED, 50),
  (BREEDING_EVENT_RECORDED, 20),
  (PROJECT_COMPLETED, 100),
];

/// The default reward for `action`, if it is a known action.
pub fn default_xp(action: &str) -> Option<u32> {
  XP_REWARDS
    .iter()
    .find(|(name, _)| *name == action)
    .map(|(_, xp)| *xp)
}

/// Completion count per action name.
pub type ActionCounts = BTreeMap<String, u64>;

/// Group events by `action` and count them.
pub fn count_actions<'a>(events: impl IntoIterator<Item = &'a XpEvent>) -> ActionCounts {
  let mut counts = ActionCounts::new();
  for event in events {
    *counts.entry(event.action.clone()).or_insert(0) += 1;
  }
  counts
}
