//! HTTP bootstrap for Roster: configuration, CORS, request tracing, and the
//! top-level router.

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use roster_core::ProfileStore;
use serde::Deserialize;
use thiserror::Error;
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub database_path:   PathBuf,
  /// Upper bound on concurrently open SQLite connections.
  pub max_connections: usize,
  /// The single browser origin allowed to call the API.
  pub allowed_origin:  String,
}

impl ServerConfig {
  /// Layer `defaults → file (optional) → environment` and deserialise.
  pub fn load(file: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 4000_i64)?
      .set_default("database_path", "roster.db")?
      .set_default("max_connections", roster_store_sqlite::DEFAULT_MAX_CONNECTIONS as i64)?
      .set_default("allowed_origin", "http://localhost:3000")?
      .add_source(config::File::from(file.into()).required(false))
      .add_source(config::Environment::with_prefix("ROSTER"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid allowed_origin {0:?}")]
  InvalidOrigin(String),
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application: the API under `/api`, wrapped in CORS and
/// request tracing.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Result<Router, Error>
where
  S: ProfileStore + 'static,
{
  let origin = HeaderValue::from_str(&config.allowed_origin)
    .map_err(|_| Error::InvalidOrigin(config.allowed_origin.clone()))?;

  let cors = CorsLayer::new()
    .allow_origin(AllowOrigin::list([origin]))
    .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE])
    .allow_credentials(true);

  Ok(
    Router::new()
      .nest("/api", roster_api::api_router(store))
      .layer(cors)
      .layer(TraceLayer::new_for_http()),
  )
}
