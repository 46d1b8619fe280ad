//! Handlers for `/api/achievements`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/achievements` | Unlocked achievements, oldest first |
//! | `GET`  | `/api/achievements/catalog` | Every definition, with `unlocked_at` when held |

use std::collections::HashMap;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use steading_core::{
  achievement::{AchievementView, UnlockedAchievement},
  catalog::CATALOG,
  store::ProgressStore,
};

use crate::{AppState, auth::Authenticated};

/// `GET /api/achievements`
pub async fn list<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Json<Vec<UnlockedAchievement>>
where
  S: ProgressStore + 'static,
{
  Json(state.progression.get_user_achievements().await)
}

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
  #[serde(flatten)]
  pub achievement: AchievementView,
  pub unlocked:    bool,
  pub unlocked_at: Option<DateTime<Utc>>,
}

/// `GET /api/achievements/catalog`
pub async fn catalog<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Json<Vec<CatalogEntry>>
where
  S: ProgressStore + 'static,
{
  let held: HashMap<String, DateTime<Utc>> = state
    .progression
    .get_user_achievements()
    .await
    .into_iter()
    .map(|u| (u.achievement.id, u.unlocked_at))
    .collect();

  let entries = CATALOG
    .iter()
    .map(|def| {
      let unlocked_at = held.get(def.id).copied();
      CatalogEntry {
        achievement: def.view(),
        unlocked: unlocked_at.is_some(),
        unlocked_at,
      }
    })
    .collect();

  Json(entries)
}
