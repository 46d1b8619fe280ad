//! JSON API over the Steading progression engine.
//!
//! Exposes an axum [`Router`] backed by any [`ProgressStore`]. The deployment
//! is single-tenant: every authenticated request acts as the configured user.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use steading_core::{identity::StaticIdentity, store::ProgressStore};
use steading_engine::Progression;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use auth::AuthConfig;
use handlers::{achievements, stats, xp};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// The tenant every authenticated request acts as.
  pub user_id:            Uuid,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub progression: Progression<S, StaticIdentity>,
  pub auth:        Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      progression: self.progression.clone(),
      auth:        Arc::clone(&self.auth),
    }
  }
}

impl<S> AppState<S>
where
  S: ProgressStore + 'static,
{
  /// Wire the engine for the configured tenant.
  pub fn new(store: Arc<S>, config: &ServerConfig) -> Self {
    let auth = AuthConfig {
      username:      config.auth_username.clone(),
      password_hash: config.auth_password_hash.clone(),
    };
    Self {
      progression: Progression::new(store, StaticIdentity(config.user_id)),
      auth:        Arc::new(auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ProgressStore + 'static,
{
  Router::new()
    // Ledger
    .route("/api/xp", post(xp::award::<S>))
    .route("/api/stats", get(stats::get::<S>))
    .route("/api/stats/rebuild", post(stats::rebuild::<S>))
    .route("/api/actions", get(stats::actions::<S>))
    // Achievements
    .route("/api/achievements", get(achievements::list::<S>))
    .route("/api/achievements/catalog", get(achievements::catalog::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::time::Duration;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use steading_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use handlers::{stats::StatsBody, xp::AwardAccepted};

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt  = SaltString::generate(&mut OsRng);
    let hash  = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState::new(Arc::new(store), &ServerConfig {
      host:               "127.0.0.1".to_string(),
      port:               8484,
      store_path:         PathBuf::from(":memory:"),
      user_id:            Uuid::new_v4(),
      auth_username:      "farmer".to_string(),
      auth_password_hash: hash,
    })
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn send(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::AUTHORIZATION, auth_header("farmer", "secret"));
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router(state).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  /// Poll `/api/stats` until the background award lands.
  async fn wait_for_total(state: &AppState<SqliteStore>, total: u64) -> StatsBody {
    for _ in 0..100 {
      let resp  = send(state.clone(), "GET", "/api/stats", None).await;
      let stats: StatsBody = json_body(resp).await;
      if stats.total_xp == total {
        return stats;
      }
      tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("total_xp never reached {total}");
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_credentials_are_rejected() {
    let state = make_state("secret").await;
    let req   = Request::builder().uri("/api/stats").body(Body::empty()).unwrap();
    let resp  = router(state).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert_eq!(challenge, "Basic realm=\"steading\"");
  }

  #[tokio::test]
  async fn wrong_password_is_rejected() {
    let state = make_state("other").await;
    let resp  = send(state, "GET", "/api/stats", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── XP ──────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn fresh_user_stats_are_level_one() {
    let state = make_state("secret").await;
    let resp  = send(state, "GET", "/api/stats", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stats: StatsBody = json_body(resp).await;
    assert_eq!(stats, StatsBody {
      total_xp:         0,
      level:            1,
      xp_into_level:    0,
      xp_to_next_level: 100,
    });
  }

  #[tokio::test]
  async fn award_is_accepted_then_applied() {
    let state = make_state("secret").await;
    let resp  = send(
      state.clone(),
      "POST",
      "/api/xp",
      Some(json!({ "action": "task_completed", "xp": 125, "metadata": { "task_id": "t1" } })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let accepted: AwardAccepted = json_body(resp).await;
    assert_eq!(accepted, AwardAccepted { action: "task_completed".into(), xp: 125 });

    let stats = wait_for_total(&state, 125).await;
    assert_eq!(stats.level, 2);
    assert_eq!(stats.xp_into_level, 25);
  }

  #[tokio::test]
  async fn known_action_uses_default_reward() {
    let state = make_state("secret").await;
    let resp  = send(state.clone(), "POST", "/api/xp", Some(json!({ "action": "goal_completed" }))).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let accepted: AwardAccepted = json_body(resp).await;
    assert_eq!(accepted.xp, 50);

    wait_for_total(&state, 50).await;
  }

  #[tokio::test]
  async fn unknown_action_needs_explicit_xp() {
    let state = make_state("secret").await;
    let resp  = send(state, "POST", "/api/xp", Some(json!({ "action": "fence_mended" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn blank_action_is_rejected() {
    let state = make_state("secret").await;
    let resp  = send(state, "POST", "/api/xp", Some(json!({ "action": "  ", "xp": 5 }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn action_counts_reflect_the_log() {
    let state = make_state("secret").await;
    // One at a time: concurrent awards may overwrite each other's total.
    for (a, total) in [("animal_added", 15), ("animal_added", 30), ("journal_entry_created", 35)] {
      send(state.clone(), "POST", "/api/xp", Some(json!({ "action": a }))).await;
      wait_for_total(&state, total).await;
    }

    let resp = send(state, "GET", "/api/actions", None).await;
    let counts: Value = json_body(resp).await;
    assert_eq!(counts, json!({ "animal_added": 2, "journal_entry_created": 1 }));
  }

  #[tokio::test]
  async fn rebuild_recomputes_from_events() {
    let state = make_state("secret").await;
    send(state.clone(), "POST", "/api/xp", Some(json!({ "action": "project_completed" }))).await;
    wait_for_total(&state, 100).await;

    let resp = send(state, "POST", "/api/stats/rebuild", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats: StatsBody = json_body(resp).await;
    assert_eq!((stats.total_xp, stats.level), (100, 2));
  }

  // ── Achievements ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn achievements_after_first_task() {
    let state = make_state("secret").await;
    send(state.clone(), "POST", "/api/xp", Some(json!({ "action": "task_completed" }))).await;
    wait_for_total(&state, 10).await;

    // The unlock is written after the stats upsert; give it a moment.
    let mut unlocked: Vec<Value> = Vec::new();
    for _ in 0..100 {
      let resp = send(state.clone(), "GET", "/api/achievements", None).await;
      unlocked = json_body(resp).await;
      if !unlocked.is_empty() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0]["id"], "first_task");
    assert_eq!(unlocked[0]["action_type"], "task_completed");
    assert!(unlocked[0]["unlocked_at"].is_string());

    let resp = send(state, "GET", "/api/achievements/catalog", None).await;
    let catalog: Vec<Value> = json_body(resp).await;
    assert_eq!(catalog.len(), steading_core::catalog::CATALOG.len());
    let held: Vec<_> = catalog
      .iter()
      .filter(|e| e["unlocked"] == true)
      .map(|e| e["id"].as_str().unwrap())
      .collect();
    assert_eq!(held, vec!["first_task"]);
  }
}
