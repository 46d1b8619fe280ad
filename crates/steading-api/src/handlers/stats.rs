//! Handlers for `/api/stats` and `/api/actions`.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use steading_core::{action::ActionCounts, stats::xp_to_next_level, store::ProgressStore};

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsBody {
  pub total_xp:         u64,
  pub level:            u64,
  pub xp_into_level:    u64,
  pub xp_to_next_level: u64,
}

impl StatsBody {
  fn new(total_xp: u64, level: u64) -> Self {
    let (xp_into_level, xp_to_next_level) = xp_to_next_level(total_xp);
    Self { total_xp, level, xp_into_level, xp_to_next_level }
  }
}

/// `GET /api/stats`
pub async fn get<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Json<StatsBody>
where
  S: ProgressStore + 'static,
{
  let summary = state.progression.get_user_stats().await;
  Json(StatsBody::new(summary.total_xp, summary.level))
}

/// `POST /api/stats/rebuild` — recompute the cached totals from the event log.
pub async fn rebuild<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<StatsBody>, Error>
where
  S: ProgressStore + 'static,
{
  let stats = state
    .progression
    .rebuild_stats()
    .await
    .ok_or_else(|| Error::Unavailable("could not rebuild stats".into()))?;
  Ok(Json(StatsBody::new(stats.total_xp, stats.level)))
}

/// `GET /api/actions`
pub async fn actions<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Json<ActionCounts>
where
  S: ProgressStore + 'static,
{
  Json(state.progression.get_action_counts().await)
}
