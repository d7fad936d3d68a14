//! Error type for `roster-store-sqlite`.

use roster_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A write hit the UNIQUE constraint on `username` or `email`.
  #[error("Username or email already exists")]
  Duplicate,

  /// Any other failure, tagged with the operation that was running.
  #[error("error {op}: {source}")]
  Database {
    op:     &'static str,
    #[source]
    source: tokio_rusqlite::Error,
  },

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("store returned an invalid profile id: {0}")]
  InvalidId(i64),

  #[error("max_connections must be at least 1")]
  EmptyPool,
}

impl Error {
  /// Classify a raw driver failure for operation `op`.
  pub(crate) fn classify(op: &'static str, source: tokio_rusqlite::Error) -> Self {
    if is_unique_violation(&source) {
      Self::Duplicate
    } else {
      Self::Database { op, source }
    }
  }
}

impl StoreError for Error {
  fn is_duplicate(&self) -> bool { matches!(self, Self::Duplicate) }
}

/// `true` when `err` is SQLite's `SQLITE_CONSTRAINT_UNIQUE`.
pub fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  match err {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)) => {
      e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    }
    _ => false,
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
