//! SQL schema for the Steading SQLite store.
//!
//! Executed once at connection startup. Table and column names are shared
//! with the hosted deployment and must not change.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS xp_events (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    action      TEXT NOT NULL,
    xp          INTEGER NOT NULL CHECK (xp >= 0),
    metadata    TEXT,            -- JSON object or NULL
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- Cache over xp_events; re-derivable by summing the log.
CREATE TABLE IF NOT EXISTS user_stats (
    user_id     TEXT PRIMARY KEY,
    total_xp    INTEGER NOT NULL DEFAULT 0 CHECK (total_xp >= 0),
    level       INTEGER NOT NULL DEFAULT 1 CHECK (level >= 1),
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_achievements (
    id              TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL,
    achievement_id  TEXT NOT NULL,
    unlocked_at     TEXT NOT NULL,
    UNIQUE (user_id, achievement_id)
);

CREATE INDEX IF NOT EXISTS xp_events_user_idx         ON xp_events(user_id);
CREATE INDEX IF NOT EXISTS xp_events_user_action_idx  ON xp_events(user_id, action);

PRAGMA user_version = 1;
";
