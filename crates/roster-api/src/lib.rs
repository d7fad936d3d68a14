//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any [`roster_core::ProfileStore`].
//! CORS, tracing, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod profiles;

use std::sync::Arc;

use axum::{Router, routing::get};
use roster_core::ProfileStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ProfileStore + 'static,
{
  Router::new()
    .route("/profiles", get(profiles::list::<S>).post(profiles::create::<S>))
    .route("/profile/{id}", get(profiles::get_one::<S>).patch(profiles::update::<S>))
    .with_state(store)
}
