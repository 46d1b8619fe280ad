//! Handler for `POST /api/xp`.
//!
//! Body: `{"action": "...", "xp": 10, "metadata": {...}}`. `xp` may be
//! omitted for known actions, in which case the default reward applies.
//! Responds `202 Accepted` as soon as the award is spawned.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use steading_core::{action, event::Metadata, store::ProgressStore};

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Deserialize)]
pub struct AwardBody {
  pub action:   String,
  pub xp:       Option<u32>,
  pub metadata: Option<Metadata>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwardAccepted {
  pub action: String,
  pub xp:     u32,
}

/// `POST /api/xp`
pub async fn award<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Json(body): Json<AwardBody>,
) -> Result<impl IntoResponse, Error>
where
  S: ProgressStore + 'static,
{
  let action = body.action.trim();
  if action.is_empty() {
    return Err(Error::BadRequest("action must not be empty".into()));
  }

  let xp = body
    .xp
    .or_else(|| action::default_xp(action))
    .ok_or_else(|| Error::BadRequest(format!("no default xp for action {action:?}; pass xp")))?;

  // Detached: the award completes in the background.
  drop(state.progression.award_xp(action, xp, body.metadata));

  Ok((
    StatusCode::ACCEPTED,
    Json(AwardAccepted { action: action.to_owned(), xp }),
  ))
}
