//! The `ProgressStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `steading-store-sqlite`). The engine and the API depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  achievement::UserAchievement,
  event::{NewXpEvent, XpEvent},
  stats::UserStats,
};

/// Table-scoped operations over `xp_events`, `user_stats` and
/// `user_achievements`.
///
/// `xp_events` and `user_achievements` are append-only. `user_stats` is
/// written by upsert on `user_id`.
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tokio tasks.
pub trait ProgressStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── XP events ─────────────────────────────────────────────────────────

  /// Append an event and return it. `event_id` and `created_at` are set by
  /// the store.
  fn append_xp_event(
    &self,
    input: NewXpEvent,
  ) -> impl Future<Output = Result<XpEvent, Self::Error>> + Send + '_;

  /// All events for a user, oldest first.
  fn list_xp_events(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<XpEvent>, Self::Error>> + Send + '_;

  /// Sum of `xp` over a user's events; 0 for an empty log.
  fn sum_xp(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Stats ─────────────────────────────────────────────────────────────

  /// The stats row for a user. `None` until the first upsert.
  fn get_user_stats(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserStats>, Self::Error>> + Send + '_;

  /// Insert the row, or overwrite `total_xp`, `level` and `updated_at` in
  /// place if one already exists for `stats.user_id`.
  fn upsert_user_stats(
    &self,
    stats: UserStats,
  ) -> impl Future<Output = Result<UserStats, Self::Error>> + Send + '_;

  // ── Achievements ──────────────────────────────────────────────────────

  /// All unlock records for a user, oldest first.
  fn list_user_achievements(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<UserAchievement>, Self::Error>> + Send + '_;

  /// Record an unlock. Fails if the user already holds `achievement_id`;
  /// `unlocked_at` is set by the store.
  fn insert_user_achievement<'a>(
    &'a self,
    user_id: Uuid,
    achievement_id: &'a str,
  ) -> impl Future<Output = Result<UserAchievement, Self::Error>> + Send + 'a;
}
