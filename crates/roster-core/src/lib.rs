//! Core types and trait definitions for the Roster profile directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store, API, and client crates all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod profile;
pub mod store;
pub mod validate;

pub use profile::{NewProfile, Profile, ProfileChanges, ProfileId, ProfileInput, ProfilePatch};
pub use store::{ProfileStore, StoreError};
pub use validate::{FieldError, ValidationErrors};
