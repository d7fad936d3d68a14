//! SQL schema for the Roster SQLite store.
//!
//! Executed once per pool, on the first connection, before any other
//! connection is opened.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT guarantees ids are never reused, even after the highest row
-- is gone.
CREATE TABLE IF NOT EXISTS profiles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL COLLATE NOCASE UNIQUE,
    bio         TEXT,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS profiles_created_idx ON profiles(created_at);

PRAGMA user_version = 1;
";

/// Per-connection settings, applied to every connection in a pool.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
";
