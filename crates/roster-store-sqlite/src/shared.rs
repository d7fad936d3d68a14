//! A process-wide [`SqlitePool`] for callers that cannot thread a handle
//! through their constructors.
//!
//! The first call to [`shared_pool`] opens the pool; every later call returns
//! a clone of it until [`close_shared_pool`] tears it down. Initialisation
//! happens under an async mutex, so concurrent first calls still open exactly
//! one pool.

use tokio::sync::Mutex;

use crate::{PoolOptions, Result, SqlitePool};

static SHARED: Mutex<Option<SqlitePool>> = Mutex::const_new(None);

/// Return the shared pool, opening it with `options` on first use.
///
/// `options` is ignored once the pool exists.
pub async fn shared_pool(options: &PoolOptions) -> Result<SqlitePool> {
  let mut slot = SHARED.lock().await;
  if let Some(pool) = slot.as_ref() {
    return Ok(pool.clone());
  }
  let pool = SqlitePool::open(options).await?;
  tracing::info!(connections = pool.size(), "shared sqlite pool initialised");
  *slot = Some(pool.clone());
  Ok(pool)
}

/// Close and forget the shared pool. A later [`shared_pool`] call opens a
/// fresh one. No-op if the pool was never opened.
pub async fn close_shared_pool() -> Result<()> {
  let pool = SHARED.lock().await.take();
  match pool {
    Some(pool) => pool.close().await,
    None => Ok(()),
  }
}
