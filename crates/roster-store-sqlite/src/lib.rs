//! SQLite backend for the Roster profile directory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on dedicated
//! connection threads without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod pool;
pub mod shared;

pub use error::{Error, Result};
pub use pool::{DEFAULT_MAX_CONNECTIONS, PoolOptions, SqlitePool};
pub use store::SqliteStore;
