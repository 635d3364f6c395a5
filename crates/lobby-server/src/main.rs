//! lobby-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `LOBBY_*`
//! environment variables, opens the SQLite store and serves the JSON API.
//!
//! # Seeding the roster
//!
//! ```text
//! lobby-server --seed-roster hosts.json
//! ```
//!
//! where `hosts.json` is an array of `{"name": …, "division": …, "org_unit": …}`
//! objects. Hosts are appended and the server then starts as usual.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use lobby_server::{ServerConfig, app, open_store, seed_roster};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Lobby visit registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Append the hosts in this JSON file to the roster before serving.
  #[arg(long, value_name = "FILE")]
  seed_roster: Option<PathBuf>,
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
  let cfg = ServerConfig::load(&cli.config)?;

  let store = open_store(&cfg).await?;
  if let Some(file) = &cli.seed_roster {
    seed_roster(&store, file).await?;
  }

  let address = cfg.address();
  let app = app(Arc::new(store), cfg.desk());

  tracing::info!(initial_status = %cfg.initial_status, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
