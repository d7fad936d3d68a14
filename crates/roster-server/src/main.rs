//! roster-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus
//! `ROSTER_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! # Connectivity check
//!
//! To verify the database is reachable without starting the server:
//!
//! ```text
//! cargo run -p roster-server -- --check
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use roster_server::ServerConfig;
use roster_store_sqlite::{
  PoolOptions, SqliteStore,
  shared::{close_shared_pool, shared_pool},
};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster profile directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Open the database, print the number of stored profiles, and exit.
  #[arg(long)]
  check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(cli.config).context("failed to load configuration")?;

  // The process-wide pool; everything downstream receives a handle to it.
  let pool_options =
    PoolOptions::file(&server_cfg.database_path).max_connections(server_cfg.max_connections);
  let pool = shared_pool(&pool_options).await.with_context(|| {
    format!("failed to open store at {:?}", server_cfg.database_path)
  })?;
  let store = SqliteStore::new(pool);

  if cli.check {
    let count = store.count().await.context("failed to query profiles")?;
    println!("database ok: {count} profiles in {:?}", server_cfg.database_path);
    close_shared_pool().await.context("failed to close store")?;
    return Ok(());
  }

  tracing::info!(
    path = ?server_cfg.database_path,
    connections = store.pool().size(),
    "store opened"
  );

  let app = roster_server::router(Arc::new(store.clone()), &server_cfg)?;
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  close_shared_pool().await.context("failed to close store")?;
  tracing::info!("shut down cleanly");
  Ok(())
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown requested");
}
