//! The `ProfileStore` trait and the error capability it requires.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::profile::{NewProfile, Profile, ProfileChanges, ProfileId};

// ─── Error capability ────────────────────────────────────────────────────────

/// Errors a [`ProfileStore`] may return.
///
/// Callers classify failures through this capability rather than by
/// inspecting backend-specific error codes.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when a write was rejected by a uniqueness constraint on
  /// `username` or `email`. No row was changed.
  fn is_duplicate(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a profile store backend.
///
/// Every method issues a single logical statement against the store and is
/// attempted once; there are no retries at this layer.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ProfileStore: Send + Sync {
  type Error: StoreError;

  /// All profiles, newest `created_at` first. An empty store yields an empty
  /// vector.
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  /// Retrieve a profile by id. Returns `None` if not found.
  fn get_profile(
    &self,
    id: ProfileId,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Insert a new profile and return the row as read back from the store.
  ///
  /// Fails with an error whose [`StoreError::is_duplicate`] is `true` when
  /// the username or email is already taken.
  fn create_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Overwrite all mutable columns of `id` and return the row as read back.
  /// Returns `None` if no row matched.
  fn update_profile(
    &self,
    id: ProfileId,
    changes: ProfileChanges,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;
}
