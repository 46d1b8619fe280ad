//! `server`: runs the progression API for one tenant.
//!
//! Settings come from a TOML file (`--config`, default `config.toml`) with
//! `STEADING_*` environment variables layered on top. See
//! `config.example.toml` for the keys.
//!
//! `--hash-password` turns a password read from stdin into the argon2 PHC
//! string expected in `auth_password_hash`. `--rebuild-stats` re-derives the
//! tenant's cached totals from the event log and exits.

use std::{
  io::{self, Write as _},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, bail};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use steading_api::{AppState, ServerConfig};
use steading_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Steading progression server")]
struct Cli {
  /// TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Hash a password read from stdin, print it and exit.
  #[arg(long, conflicts_with = "rebuild_stats")]
  hash_password: bool,

  /// Replay the tenant's event log into the stats cache and exit.
  #[arg(long)]
  rebuild_stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  if cli.hash_password {
    println!("{}", hash_stdin_password()?);
    return Ok(());
  }

  let cfg = load_config(&cli.config)?;
  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("opening store at {}", cfg.store_path.display()))?;
  let state = AppState::new(Arc::new(store), &cfg);

  if cli.rebuild_stats {
    let Some(stats) = state.progression.rebuild_stats().await else {
      bail!("stats rebuild failed for {}; see the log", cfg.user_id);
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    return Ok(());
  }

  let listener = TcpListener::bind((cfg.host.as_str(), cfg.port))
    .await
    .with_context(|| format!("binding {}:{}", cfg.host, cfg.port))?;
  tracing::info!(addr = %listener.local_addr()?, user_id = %cfg.user_id, "serving");

  axum::serve(listener, steading_api::router(state))
    .await
    .context("server exited")
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let mut cfg: ServerConfig = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("STEADING"))
    .build()
    .and_then(config::Config::try_deserialize)
    .with_context(|| format!("loading configuration from {}", path.display()))?;

  if let Ok(rest) = cfg.store_path.strip_prefix("~")
    && let Some(home) = std::env::var_os("HOME")
  {
    cfg.store_path = PathBuf::from(home).join(rest);
  }
  Ok(cfg)
}

fn hash_stdin_password() -> anyhow::Result<String> {
  eprint!("Password: ");
  io::stderr().flush()?;

  let Some(line) = io::stdin().lines().next().transpose()? else {
    bail!("no password on stdin");
  };
  let password = line.trim_end_matches('\r');
  if password.is_empty() {
    bail!("password must not be empty");
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| anyhow::anyhow!("argon2: {e}"))
}
