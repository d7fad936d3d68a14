//! [`SqlitePool`]: a fixed set of connections to one database.
//!
//! Each [`tokio_rusqlite::Connection`] owns a worker thread and an unbounded
//! request queue, so a pool of `n` connections runs up to `n` statements at
//! once and queues everything beyond that instead of failing.

use std::{
  path::PathBuf,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use crate::{
  Error, Result,
  schema::{CONNECTION_PRAGMAS, SCHEMA},
};

/// Pool size used when none is configured.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Options ─────────────────────────────────────────────────────────────────

/// Where and how to open a [`SqlitePool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
  /// Database file; `None` for a private in-memory database.
  pub path:            Option<PathBuf>,
  pub max_connections: usize,
  /// How long a connection waits on a locked database before giving up.
  pub busy_timeout:    Duration,
}

impl PoolOptions {
  pub fn file(path: impl Into<PathBuf>) -> Self {
    Self {
      path:            Some(path.into()),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      busy_timeout:    DEFAULT_BUSY_TIMEOUT,
    }
  }

  /// An in-memory database. Always served by a single connection, since
  /// separate in-memory connections would each see their own empty database.
  pub fn in_memory() -> Self {
    Self {
      path:            None,
      max_connections: 1,
      busy_timeout:    DEFAULT_BUSY_TIMEOUT,
    }
  }

  pub fn max_connections(mut self, n: usize) -> Self {
    self.max_connections = n;
    self
  }

  pub fn busy_timeout(mut self, timeout: Duration) -> Self {
    self.busy_timeout = timeout;
    self
  }
}

// ─── Pool ────────────────────────────────────────────────────────────────────

/// A round-robin pool of SQLite connections.
///
/// Cloning is cheap: clones share the same connections.
#[derive(Clone)]
pub struct SqlitePool {
  inner: Arc<Inner>,
}

struct Inner {
  conns: Vec<tokio_rusqlite::Connection>,
  next:  AtomicUsize,
}

impl SqlitePool {
  /// Open every connection and run schema initialisation on the first one.
  pub async fn open(options: &PoolOptions) -> Result<Self> {
    if options.max_connections == 0 {
      return Err(Error::EmptyPool);
    }

    let first = open_connection(options).await?;
    first
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(|source| Error::Database { op: "initialising schema", source })?;

    let size = if options.path.is_some() { options.max_connections } else { 1 };
    let mut conns = Vec::with_capacity(size);
    conns.push(first);
    for _ in 1..size {
      conns.push(open_connection(options).await?);
    }

    tracing::debug!(
      path = ?options.path,
      connections = size,
      "sqlite pool opened"
    );

    Ok(Self {
      inner: Arc::new(Inner { conns, next: AtomicUsize::new(0) }),
    })
  }

  /// Number of physical connections.
  pub fn size(&self) -> usize { self.inner.conns.len() }

  /// `true` when both handles refer to the same underlying pool.
  pub fn ptr_eq(a: &Self, b: &Self) -> bool { Arc::ptr_eq(&a.inner, &b.inner) }

  /// The next connection in round-robin order.
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection {
    let i = self.inner.next.fetch_add(1, Ordering::Relaxed) % self.inner.conns.len();
    &self.inner.conns[i]
  }

  /// Close every connection. Calls issued afterwards through any clone of
  /// this pool fail.
  pub async fn close(&self) -> Result<()> {
    for conn in &self.inner.conns {
      conn
        .clone()
        .close()
        .await
        .map_err(|source| Error::Database { op: "closing store", source })?;
    }
    tracing::debug!("sqlite pool closed");
    Ok(())
  }
}

async fn open_connection(options: &PoolOptions) -> Result<tokio_rusqlite::Connection> {
  let conn = match &options.path {
    Some(path) => tokio_rusqlite::Connection::open(path).await,
    None => tokio_rusqlite::Connection::open_in_memory().await,
  }
  .map_err(|source| Error::Database { op: "opening store", source })?;

  let timeout = options.busy_timeout;
  conn
    .call(move |conn| {
      conn.busy_timeout(timeout)?;
      conn.execute_batch(CONNECTION_PRAGMAS)?;
      Ok(())
    })
    .await
    .map_err(|source| Error::Database { op: "opening store", source })?;

  Ok(conn)
}
