//! HTTP server wiring for the Lobby visit registry.
//!
//! Loads [`ServerConfig`], opens the SQLite store and mounts the JSON API
//! under `/api`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Router, routing::get};
use chrono::{FixedOffset, Offset as _, Utc};
use lobby_core::{
  desk::DeskConfig,
  directory::NewHost,
  store::{Roster, VisitStore},
  visit::VisitStatus,
};
use lobby_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LOBBY_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Status of newly registered visits: `active` or `pending`.
  pub initial_status: VisitStatus,
  /// Desk wall-clock offset, e.g. `"+01:00"`.
  #[serde(with = "lobby_core::desk::utc_offset")]
  pub utc_offset:     FixedOffset,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           "127.0.0.1".into(),
      port:           8080,
      store_path:     PathBuf::from("~/.local/share/lobby/lobby.db"),
      initial_status: VisitStatus::Active,
      utc_offset:     Utc.fix(),
    }
  }
}

impl ServerConfig {
  /// Layer the optional file at `path` under `LOBBY_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LOBBY"))
      .build()
      .context("failed to read config file")?;

    let cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    if cfg.initial_status == VisitStatus::Completed {
      anyhow::bail!("initial_status must be `pending` or `active`");
    }
    Ok(cfg)
  }

  pub fn desk(&self) -> DeskConfig {
    DeskConfig {
      initial_status: self.initial_status,
      utc_offset:     self.utc_offset,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Open the store at the configured path, creating parent directories.
pub async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let path = expand_tilde(&cfg.store_path);
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

/// Append the hosts listed in a JSON array file to the roster.
pub async fn seed_roster(store: &SqliteStore, file: &Path) -> anyhow::Result<usize> {
  let raw = std::fs::read_to_string(file)
    .with_context(|| format!("failed to read roster file {}", file.display()))?;
  let hosts: Vec<NewHost> =
    serde_json::from_str(&raw).context("roster file must be a JSON array of hosts")?;
  let added = store
    .add_hosts(hosts)
    .await
    .context("failed to write roster")?;
  tracing::info!(count = added.len(), file = %file.display(), "seeded roster");
  Ok(added.len())
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The complete application: API under `/api`, a liveness check at
/// `/health`, and request tracing.
pub fn app<S>(store: Arc<S>, desk: DeskConfig) -> Router
where
  S: VisitStore + Roster + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", lobby_api::api_router(store, desk))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
