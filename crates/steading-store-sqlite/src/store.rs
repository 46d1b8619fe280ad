//! [`SqliteStore`] — the SQLite implementation of [`ProgressStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use steading_core::{
  achievement::UserAchievement,
  catalog,
  event::{NewXpEvent, XpEvent},
  stats::UserStats,
  store::ProgressStore,
};

use crate::{
  encode::{
    RawUserAchievement, RawUserStats, RawXpEvent, encode_dt, encode_u64,
    encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A progression store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ProgressStore impl ──────────────────────────────────────────────────────

impl ProgressStore for SqliteStore {
  type Error = Error;

  // ── XP events ─────────────────────────────────────────────────────────────

  async fn append_xp_event(&self, input: NewXpEvent) -> Result<XpEvent> {
    let event = XpEvent {
      event_id:   Uuid::new_v4(),
      user_id:    input.user_id,
      action:     input.action,
      xp:         input.xp,
      metadata:   input.metadata,
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(event.event_id);
    let user_id_str  = encode_uuid(event.user_id);
    let action       = event.action.clone();
    let xp           = i64::from(event.xp);
    let metadata_str = event.metadata_json()?;
    let at_str       = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO xp_events (id, user_id, action, xp, metadata, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, user_id_str, action, xp, metadata_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn list_xp_events(&self, user_id: Uuid) -> Result<Vec<XpEvent>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawXpEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, user_id, action, xp, metadata, created_at
           FROM xp_events
           WHERE user_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawXpEvent {
              id:         row.get(0)?,
              user_id:    row.get(1)?,
              action:     row.get(2)?,
              xp:         row.get(3)?,
              metadata:   row.get(4)?,
              created_at: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawXpEvent::into_event).collect()
  }

  async fn sum_xp(&self, user_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(user_id);

    let total: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(xp), 0) FROM xp_events WHERE user_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    u64::try_from(total).map_err(|_| Error::OutOfRange {
      column: "xp_events.xp",
      value:  total.to_string(),
    })
  }

  // ── Stats ─────────────────────────────────────────────────────────────────

  async fn get_user_stats(&self, user_id: Uuid) -> Result<Option<UserStats>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUserStats> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, total_xp, level, updated_at
             FROM user_stats WHERE user_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawUserStats {
                user_id:    row.get(0)?,
                total_xp:   row.get(1)?,
                level:      row.get(2)?,
                updated_at: row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUserStats::into_stats).transpose()
  }

  async fn upsert_user_stats(&self, stats: UserStats) -> Result<UserStats> {
    let id_str   = encode_uuid(stats.user_id);
    let total    = encode_u64("user_stats.total_xp", stats.total_xp)?;
    let level    = encode_u64("user_stats.level", stats.level)?;
    let at_str   = encode_dt(stats.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_stats (user_id, total_xp, level, updated_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (user_id) DO UPDATE SET
             total_xp   = excluded.total_xp,
             level      = excluded.level,
             updated_at = excluded.updated_at",
          rusqlite::params![id_str, total, level, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(stats)
  }

  // ── Achievements ──────────────────────────────────────────────────────────

  async fn list_user_achievements(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<UserAchievement>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawUserAchievement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, user_id, achievement_id, unlocked_at
           FROM user_achievements
           WHERE user_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawUserAchievement {
              id:             row.get(0)?,
              user_id:        row.get(1)?,
              achievement_id: row.get(2)?,
              unlocked_at:    row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUserAchievement::into_unlock).collect()
  }

  async fn insert_user_achievement<'a>(
    &'a self,
    user_id:        Uuid,
    achievement_id: &'a str,
  ) -> Result<UserAchievement> {
    // Unlock rows must reference a catalog entry.
    catalog::require(achievement_id)?;

    let unlock = UserAchievement {
      unlock_id:      Uuid::new_v4(),
      user_id,
      achievement_id: achievement_id.to_owned(),
      unlocked_at:    Utc::now(),
    };

    let id_str          = encode_uuid(unlock.unlock_id);
    let user_id_str     = encode_uuid(user_id);
    let achievement_str = unlock.achievement_id.clone();
    let at_str          = encode_dt(unlock.unlocked_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO user_achievements (id, user_id, achievement_id, unlocked_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, user_id_str, achievement_str, at_str],
        );
        match result {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::AlreadyUnlocked {
        user_id,
        achievement_id: unlock.achievement_id,
      });
    }

    Ok(unlock)
  }
}
