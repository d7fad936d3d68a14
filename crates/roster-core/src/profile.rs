//! Profile types: the single entity of the directory.
//!
//! A profile is created once (the store assigns `id` and `created_at`) and is
//! afterwards mutated only through a full-row update of its three mutable
//! columns. Nothing here ever deletes a profile.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned, strictly positive row identifier. Never reused.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProfileId(i64);

impl ProfileId {
  /// Wrap a raw id. Returns `None` unless `raw` is positive.
  pub fn new(raw: i64) -> Option<Self> { (raw > 0).then_some(Self(raw)) }

  pub fn get(self) -> i64 { self.0 }
}

impl fmt::Display for ProfileId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// A persisted profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:         ProfileId,
  pub username:   String,
  pub email:      String,
  pub bio:        Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A request body for create or update exactly as it arrived on the wire.
///
/// Every field is optional here; which ones are required is decided by
/// [`crate::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bio:      Option<String>,
}

/// Input to [`crate::store::ProfileStore::create_profile`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
  pub username: String,
  pub email:    String,
  pub bio:      Option<String>,
}

/// The complete set of mutable columns written by
/// [`crate::store::ProfileStore::update_profile`].
///
/// The store overwrites all three unconditionally, so callers holding a
/// sparse [`ProfilePatch`] must merge it with the current row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
  pub username: String,
  pub email:    String,
  pub bio:      Option<String>,
}

/// A validated, sparse update: `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
  pub username: Option<String>,
  pub email:    Option<String>,
  /// `Some(None)` clears the bio; `None` leaves it untouched.
  pub bio:      Option<Option<String>>,
}

impl ProfilePatch {
  pub fn is_empty(&self) -> bool {
    self.username.is_none() && self.email.is_none() && self.bio.is_none()
  }

  /// Merge this patch onto `current`, producing the full update tuple.
  pub fn apply_to(self, current: &Profile) -> ProfileChanges {
    ProfileChanges {
      username: self.username.unwrap_or_else(|| current.username.clone()),
      email:    self.email.unwrap_or_else(|| current.email.clone()),
      bio:      self.bio.unwrap_or_else(|| current.bio.clone()),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn alice() -> Profile {
    Profile {
      id:         ProfileId::new(7).unwrap(),
      username:   "alice123".into(),
      email:      "a@x.com".into(),
      bio:        Some("original".into()),
      created_at: Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap(),
    }
  }

  #[test]
  fn profile_id_rejects_non_positive() {
    assert!(ProfileId::new(0).is_none());
    assert!(ProfileId::new(-4).is_none());
    assert_eq!(ProfileId::new(12).map(ProfileId::get), Some(12));
  }

  #[test]
  fn empty_patch_keeps_every_field() {
    let current = alice();
    let changes = ProfilePatch::default().apply_to(&current);
    assert_eq!(changes.username, current.username);
    assert_eq!(changes.email, current.email);
    assert_eq!(changes.bio, current.bio);
  }

  #[test]
  fn patch_overrides_only_supplied_fields() {
    let current = alice();
    let patch = ProfilePatch {
      bio: Some(Some("hi".into())),
      ..Default::default()
    };
    let changes = patch.apply_to(&current);
    assert_eq!(changes.username, "alice123");
    assert_eq!(changes.email, "a@x.com");
    assert_eq!(changes.bio.as_deref(), Some("hi"));
  }

  #[test]
  fn patch_can_clear_bio() {
    let patch = ProfilePatch { bio: Some(None), ..Default::default() };
    assert!(!patch.is_empty());
    assert_eq!(patch.apply_to(&alice()).bio, None);
  }

  #[test]
  fn profile_serialises_id_as_number() {
    let json = serde_json::to_value(alice()).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["username"], "alice123");
  }
}
