//! [`SqliteStore`]: the SQLite implementation of [`ProfileStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use roster_core::{NewProfile, Profile, ProfileChanges, ProfileId, ProfileStore};

use crate::{Error, PoolOptions, Result, SqlitePool, encode::RawProfile};

const SELECT_BY_ID: &str =
  "SELECT id, username, email, bio, created_at FROM profiles WHERE id = ?1";

const SELECT_ALL: &str = "SELECT id, username, email, bio, created_at
   FROM profiles
   ORDER BY created_at DESC, id DESC";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A profile store backed by a [`SqlitePool`].
///
/// Cloning is cheap: clones share the pool.
#[derive(Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Wrap an already-open pool.
  pub fn new(pool: SqlitePool) -> Self { Self { pool } }

  /// Open (or create) a store at `path` with the default pool size.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let pool = SqlitePool::open(&PoolOptions::file(path.as_ref())).await?;
    Ok(Self::new(pool))
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let pool = SqlitePool::open(&PoolOptions::in_memory()).await?;
    Ok(Self::new(pool))
  }

  pub fn pool(&self) -> &SqlitePool { &self.pool }

  /// Number of stored profiles.
  pub async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .pool
      .connection()
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM profiles", [], |r| r.get(0))?))
      .await
      .map_err(|source| Error::Database { op: "counting profiles", source })?;
    Ok(n.max(0) as u64)
  }

  /// Close the underlying pool.
  pub async fn close(&self) -> Result<()> { self.pool.close().await }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = Error;

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    let raws: Vec<RawProfile> = self
      .pool
      .connection()
      .call(|conn| {
        let mut stmt = conn.prepare(SELECT_ALL)?;
        let rows = stmt
          .query_map([], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(|source| Error::Database { op: "fetching profiles", source })?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn get_profile(&self, id: ProfileId) -> Result<Option<Profile>> {
    let id = id.get();

    let raw: Option<RawProfile> = self
      .pool
      .connection()
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_BY_ID, rusqlite::params![id], RawProfile::from_row)
            .optional()?,
        )
      })
      .await
      .map_err(|source| Error::Database { op: "fetching profile by id", source })?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn create_profile(&self, input: NewProfile) -> Result<Profile> {
    let NewProfile { username, email, bio } = input;

    // Insert and read-back share one connection, so `last_insert_rowid`
    // refers to this insert.
    let raw: RawProfile = self
      .pool
      .connection()
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (username, email, bio) VALUES (?1, ?2, ?3)",
          rusqlite::params![username, email, bio],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(SELECT_BY_ID, rusqlite::params![id], RawProfile::from_row)?)
      })
      .await
      .map_err(|e| Error::classify("creating profile", e))?;

    let profile = raw.into_profile()?;
    tracing::debug!(id = %profile.id, "profile created");
    Ok(profile)
  }

  async fn update_profile(
    &self,
    id:      ProfileId,
    changes: ProfileChanges,
  ) -> Result<Option<Profile>> {
    let ProfileChanges { username, email, bio } = changes;
    let id = id.get();

    let raw: Option<RawProfile> = self
      .pool
      .connection()
      .call(move |conn| {
        let matched = conn.execute(
          "UPDATE profiles SET username = ?1, email = ?2, bio = ?3 WHERE id = ?4",
          rusqlite::params![username, email, bio, id],
        )?;
        if matched == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(SELECT_BY_ID, rusqlite::params![id], RawProfile::from_row)
            .optional()?,
        )
      })
      .await
      .map_err(|e| Error::classify("updating profile", e))?;

    let profile = raw.map(RawProfile::into_profile).transpose()?;
    if let Some(p) = &profile {
      tracing::debug!(id = %p.id, "profile updated");
    }
    Ok(profile)
  }
}
