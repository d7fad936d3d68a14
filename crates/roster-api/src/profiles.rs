//! Handlers for the profile endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/profiles` | `{ "profiles": [...] }`, newest first |
//! | `GET`   | `/profile/{id}` | 404 if not found |
//! | `POST`  | `/profiles` | Body: [`ProfileInput`]; returns 201 + `{ "profile": ... }` |
//! | `PATCH` | `/profile/{id}` | Body: [`ProfileInput`], every field optional |
//!
//! Each request moves through validation, a single store operation, and a
//! response; a failure at any step short-circuits straight to its error
//! response.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{Profile, ProfileInput, ProfileStore, validate};
use serde::Serialize;

use crate::error::ApiError;

/// `{ "profile": ... }`
#[derive(Debug, Serialize)]
pub struct ProfileBody {
  pub profile: Profile,
}

/// `{ "profiles": [...] }`
#[derive(Debug, Serialize)]
pub struct ProfilesBody {
  pub profiles: Vec<Profile>,
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /profiles`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<ProfilesBody>, ApiError>
where
  S: ProfileStore,
{
  let profiles = store.list_profiles().await.map_err(ApiError::from_store)?;
  Ok(Json(ProfilesBody { profiles }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /profile/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<ProfileBody>, ApiError>
where
  S: ProfileStore,
{
  let id = validate::validate_id(&raw_id)?;
  let profile = store
    .get_profile(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(ApiError::profile_not_found)?;
  Ok(Json(ProfileBody { profile }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /profiles`: returns 201 + the stored profile.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProfileStore,
{
  let Json(input) = body?;

  let missing = |field: &Option<String>| field.as_deref().is_none_or(str::is_empty);
  if missing(&input.username) || missing(&input.email) {
    return Err(ApiError::BadRequest("Username and email are required".into()));
  }

  let new_profile = validate::validate_create(&input)?;
  let profile = store
    .create_profile(new_profile)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(ProfileBody { profile })))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /profile/{id}`: only supplied fields change.
///
/// The store overwrites every mutable column, so the patch is merged onto
/// the current row before writing.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
  body: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<ProfileBody>, ApiError>
where
  S: ProfileStore,
{
  let Json(input) = body?;
  let (id, patch) = validate::validate_update(&raw_id, &input)?;

  let current = store
    .get_profile(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(ApiError::profile_not_found)?;

  let profile = store
    .update_profile(id, patch.apply_to(&current))
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(ApiError::profile_not_found)?;
  Ok(Json(ProfileBody { profile }))
}
