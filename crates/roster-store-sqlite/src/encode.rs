//! Decoding helpers between SQLite rows and Roster domain types.
//!
//! Timestamps are stored as RFC 3339 UTC strings with millisecond precision,
//! written by the column default in [`crate::schema::SCHEMA`].

use chrono::{DateTime, Utc};
use roster_core::{Profile, ProfileId};

use crate::{Error, Result};

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub id:         i64,
  pub username:   String,
  pub email:      String,
  pub bio:        Option<String>,
  pub created_at: String,
}

impl RawProfile {
  /// Positional decoder matching `SELECT id, username, email, bio, created_at`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      username:   row.get(1)?,
      email:      row.get(2)?,
      bio:        row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      id:         ProfileId::new(self.id).ok_or(Error::InvalidId(self.id))?,
      username:   self.username,
      email:      self.email,
      bio:        self.bio,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
