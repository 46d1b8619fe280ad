//! [`Progression`] — the XP ledger, action counter and achievement evaluator
//! for the current user.
//!
//! Every operation resolves the user through the injected
//! [`Identity`]. Without one, writes are no-ops and reads return zero values.

use std::{collections::HashSet, sync::Arc};

use steading_core::{
  achievement::{AchievementDefinition, UnlockedAchievement},
  action::{ActionCounts, count_actions},
  catalog,
  event::{Metadata, NewXpEvent, XpEvent},
  identity::Identity,
  stats::{StatsSummary, UserStats, level_for_xp},
  store::ProgressStore,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::notify::Notifier;

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What a single award did. Callers normally never look at this; it exists
/// so the background chain can be observed in isolation.
#[derive(Debug, Clone)]
pub enum AwardOutcome {
  /// No current user; nothing was written.
  Anonymous,
  /// Appending the event failed; nothing was written.
  EventFailed,
  /// The event was appended but the stats cache was left untouched.
  StatsFailed { event: XpEvent },
  Recorded {
    event:    XpEvent,
    stats:    UserStats,
    /// Achievements unlocked by this award, in catalog order.
    unlocked: Vec<&'static AchievementDefinition>,
  },
}

impl AwardOutcome {
  pub fn stats(&self) -> Option<&UserStats> {
    match self {
      Self::Recorded { stats, .. } => Some(stats),
      _ => None,
    }
  }

  pub fn unlocked(&self) -> &[&'static AchievementDefinition] {
    match self {
      Self::Recorded { unlocked, .. } => unlocked,
      _ => &[],
    }
  }
}

/// Handle to a spawned award. Dropping it detaches the task.
#[derive(Debug)]
pub struct AwardHandle(JoinHandle<AwardOutcome>);

impl AwardHandle {
  /// Wait for the award chain to finish. `None` if the task panicked or the
  /// runtime shut down first.
  pub async fn join(self) -> Option<AwardOutcome> {
    match self.0.await {
      Ok(outcome) => Some(outcome),
      Err(e) => {
        tracing::error!(component = "ledger", error = %e, "award task did not complete");
        None
      }
    }
  }

  pub fn is_finished(&self) -> bool { self.0.is_finished() }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Progression operations for whoever `I` says the current user is.
///
/// Cloning is cheap; clones share the store, identity and notifier.
pub struct Progression<S, I> {
  store:    Arc<S>,
  identity: Arc<I>,
  notifier: Notifier,
}

impl<S, I> Clone for Progression<S, I> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      identity: Arc::clone(&self.identity),
      notifier: self.notifier.clone(),
    }
  }
}

impl<S, I> Progression<S, I>
where
  S: ProgressStore + 'static,
  I: Identity + 'static,
{
  /// Build an engine that notifies through the default presentation.
  pub fn new(store: Arc<S>, identity: I) -> Self {
    Self { store, identity: Arc::new(identity), notifier: Notifier::new() }
  }

  pub fn with_notifier(mut self, notifier: Notifier) -> Self {
    self.notifier = notifier;
    self
  }

  pub fn notifier(&self) -> &Notifier { &self.notifier }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn current_user(&self) -> Option<Uuid> { self.identity.current_user() }

  // ── Ledger ────────────────────────────────────────────────────────────────

  /// Award `xp` for `action` in the background.
  ///
  /// Returns immediately; the append → stats → achievements → notify chain
  /// runs on a spawned task. Must be called from within a tokio runtime.
  pub fn award_xp(
    &self,
    action: impl Into<String>,
    xp: u32,
    metadata: Option<Metadata>,
  ) -> AwardHandle {
    let this = self.clone();
    let action = action.into();
    AwardHandle(tokio::spawn(async move { this.record_xp(action, xp, metadata).await }))
  }

  /// The award chain itself, awaited in place.
  ///
  /// The stats update is a read-modify-write without a lock: two concurrent
  /// awards for one user may both read the same total, and the later upsert
  /// wins. [`Self::rebuild_stats`] re-derives the total from the log.
  pub async fn record_xp(
    &self,
    action: String,
    xp: u32,
    metadata: Option<Metadata>,
  ) -> AwardOutcome {
    let Some(user_id) = self.identity.current_user() else {
      tracing::debug!(component = "ledger", %action, "no current user; xp not awarded");
      return AwardOutcome::Anonymous;
    };

    let input = NewXpEvent::new(user_id, action, xp).with_metadata(metadata);
    let event = match self.store.append_xp_event(input).await {
      Ok(event) => event,
      Err(e) => {
        tracing::warn!(component = "ledger", %user_id, error = %e, "failed to append xp event");
        return AwardOutcome::EventFailed;
      }
    };

    let current_total = match self.store.get_user_stats(user_id).await {
      Ok(stats) => stats.map_or(0, |s| s.total_xp),
      Err(e) => {
        tracing::warn!(component = "ledger", %user_id, error = %e, "failed to read user stats");
        return AwardOutcome::StatsFailed { event };
      }
    };

    let new_total = current_total.saturating_add(u64::from(xp));
    let stats = match self
      .store
      .upsert_user_stats(UserStats::from_total(user_id, new_total))
      .await
    {
      Ok(stats) => stats,
      Err(e) => {
        tracing::warn!(component = "ledger", %user_id, error = %e, "failed to upsert user stats");
        return AwardOutcome::StatsFailed { event };
      }
    };

    tracing::debug!(
      component = "ledger",
      %user_id,
      action = %event.action,
      xp,
      total_xp = stats.total_xp,
      level = stats.level,
      "xp awarded"
    );
    if stats.level > level_for_xp(current_total) {
      tracing::info!(component = "ledger", %user_id, level = stats.level, "level up");
    }

    let counts = self.get_action_counts().await;
    let unlocked = self.check_and_award_achievements(stats.total_xp, &counts).await;
    self.notifier.deliver(&unlocked);

    AwardOutcome::Recorded { event, stats, unlocked }
  }

  /// The current user's totals; `{0, 1}` for guests, new users, or when the
  /// store cannot be read.
  pub async fn get_user_stats(&self) -> StatsSummary {
    let Some(user_id) = self.identity.current_user() else {
      return StatsSummary::default();
    };

    match self.store.get_user_stats(user_id).await {
      Ok(Some(stats)) => StatsSummary::from(&stats),
      Ok(None) => StatsSummary::default(),
      Err(e) => {
        tracing::warn!(component = "ledger", %user_id, error = %e, "failed to read user stats");
        StatsSummary::default()
      }
    }
  }

  /// Replace the stats cache with the sum of the user's event log.
  pub async fn rebuild_stats(&self) -> Option<UserStats> {
    let user_id = self.identity.current_user()?;

    let total = match self.store.sum_xp(user_id).await {
      Ok(total) => total,
      Err(e) => {
        tracing::warn!(component = "ledger", %user_id, error = %e, "failed to sum xp events");
        return None;
      }
    };

    match self
      .store
      .upsert_user_stats(UserStats::from_total(user_id, total))
      .await
    {
      Ok(stats) => {
        tracing::info!(
          component = "ledger",
          %user_id,
          total_xp = stats.total_xp,
          "user stats rebuilt from event log"
        );
        Some(stats)
      }
      Err(e) => {
        tracing::warn!(component = "ledger", %user_id, error = %e, "failed to upsert user stats");
        None
      }
    }
  }

  // ── Counter ───────────────────────────────────────────────────────────────

  /// Per-action event counts, recomputed from the full log on every call.
  pub async fn get_action_counts(&self) -> ActionCounts {
    let Some(user_id) = self.identity.current_user() else {
      return ActionCounts::new();
    };

    match self.store.list_xp_events(user_id).await {
      Ok(events) => count_actions(&events),
      Err(e) => {
        tracing::warn!(component = "counter", %user_id, error = %e, "failed to read xp events");
        ActionCounts::new()
      }
    }
  }

  // ── Evaluator ─────────────────────────────────────────────────────────────

  /// Unlock every catalog achievement the user now qualifies for and does
  /// not hold yet. Returns only the ones unlocked by this call.
  pub async fn check_and_award_achievements(
    &self,
    total_xp: u64,
    counts: &ActionCounts,
  ) -> Vec<&'static AchievementDefinition> {
    let Some(user_id) = self.identity.current_user() else {
      return Vec::new();
    };

    let held: HashSet<String> = match self.store.list_user_achievements(user_id).await {
      Ok(rows) => rows.into_iter().map(|u| u.achievement_id).collect(),
      Err(e) => {
        tracing::warn!(
          component = "evaluator",
          %user_id,
          error = %e,
          "failed to read unlocked achievements"
        );
        return Vec::new();
      }
    };

    let mut newly = Vec::new();
    for def in catalog::pending(total_xp, counts, &held) {
      match self.store.insert_user_achievement(user_id, def.id).await {
        Ok(_) => {
          tracing::info!(component = "evaluator", %user_id, achievement = def.id, "achievement unlocked");
          newly.push(def);
        }
        // Most likely a concurrent unlock of the same achievement.
        Err(e) => {
          tracing::debug!(
            component = "evaluator",
            %user_id,
            achievement = def.id,
            error = %e,
            "unlock not recorded; skipping"
          );
        }
      }
    }
    newly
  }

  /// The user's unlocked achievements joined with their definitions, oldest
  /// first.
  pub async fn get_user_achievements(&self) -> Vec<UnlockedAchievement> {
    let Some(user_id) = self.identity.current_user() else {
      return Vec::new();
    };

    let rows = match self.store.list_user_achievements(user_id).await {
      Ok(rows) => rows,
      Err(e) => {
        tracing::warn!(
          component = "evaluator",
          %user_id,
          error = %e,
          "failed to read unlocked achievements"
        );
        return Vec::new();
      }
    };

    rows
      .into_iter()
      .filter_map(|row| match catalog::get(&row.achievement_id) {
        Some(def) => Some(UnlockedAchievement {
          achievement: def.view(),
          unlocked_at: row.unlocked_at,
        }),
        None => {
          tracing::warn!(
            component = "evaluator",
            %user_id,
            achievement = %row.achievement_id,
            "unlock references an id missing from the catalog"
          );
          None
        }
      })
      .collect()
  }
}
