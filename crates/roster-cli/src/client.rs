//! Async HTTP client wrapping the roster JSON API.
//!
//! Responses may arrive wrapped (`{"profile": ...}`, `{"profiles": [...]}`)
//! or bare; both are normalised into [`Profile`] values. Any non-2xx status,
//! transport failure, or undecodable body becomes a [`ClientError`] for the
//! operation that was attempted.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use roster_core::ProfileInput;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use thiserror::Error;

/// Connection settings for the roster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

// ─── Model ────────────────────────────────────────────────────────────────────

/// A profile as presented to the terminal UI. The id is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
  #[serde(deserialize_with = "id_as_string")]
  pub id:         String,
  pub username:   String,
  pub email:      String,
  #[serde(default)]
  pub bio:        Option<String>,
  pub created_at: DateTime<Utc>,
}

fn id_as_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum RawId {
    Number(i64),
    Text(String),
  }
  Ok(match RawId::deserialize(d)? {
    RawId::Number(n) => n.to_string(),
    RawId::Text(s) => s,
  })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneEnvelope {
  Wrapped { profile: Profile },
  Bare(Profile),
}

impl From<OneEnvelope> for Profile {
  fn from(e: OneEnvelope) -> Self {
    match e {
      OneEnvelope::Wrapped { profile } | OneEnvelope::Bare(profile) => profile,
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManyEnvelope {
  Wrapped { profiles: Vec<Profile> },
  Bare(Vec<Profile>),
}

impl From<ManyEnvelope> for Vec<Profile> {
  fn from(e: ManyEnvelope) -> Self {
    match e {
      ManyEnvelope::Wrapped { profiles } | ManyEnvelope::Bare(profiles) => profiles,
    }
  }
}

/// `{"error": "..."}` or `{"errors": [{"message": "..."}]}`.
#[derive(Deserialize)]
struct ErrorBody {
  error:  Option<String>,
  #[serde(default)]
  errors: Vec<FieldErrorBody>,
}

#[derive(Deserialize)]
struct FieldErrorBody {
  message: String,
}

impl ErrorBody {
  fn into_detail(self) -> Option<String> {
    if let Some(e) = self.error {
      return Some(e);
    }
    (!self.errors.is_empty()).then(|| {
      self
        .errors
        .into_iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ")
    })
  }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

/// The API operation a [`ClientError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  List,
  Fetch,
  Create,
  Update,
}

impl Operation {
  /// Fixed, user-facing failure message.
  pub fn failure_message(self) -> &'static str {
    match self {
      Self::List => "Could not load profiles",
      Self::Fetch => "Could not load the profile",
      Self::Create => "Could not create the profile",
      Self::Update => "Could not update the profile",
    }
  }
}

#[derive(Debug, Error)]
#[error("{}", .op.failure_message())]
pub struct ClientError {
  pub op:     Operation,
  /// `None` when no response was received.
  pub status: Option<StatusCode>,
  /// Server-provided or transport-level explanation, if any.
  pub detail: Option<String>,
}

impl ClientError {
  /// The fixed message plus whatever detail is available, for the status
  /// bar.
  pub fn describe(&self) -> String {
    match &self.detail {
      Some(d) => format!("{self}: {d}"),
      None => self.to_string(),
    }
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the roster JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  async fn send<T: DeserializeOwned>(
    &self,
    op: Operation,
    req: RequestBuilder,
  ) -> Result<T, ClientError> {
    let resp = req.send().await.map_err(|e| ClientError {
      op,
      status: None,
      detail: Some(e.to_string()),
    })?;

    let status = resp.status();
    tracing::debug!(?op, %status, url = %resp.url(), "api response");

    if !status.is_success() {
      let detail = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(ErrorBody::into_detail);
      return Err(ClientError { op, status: Some(status), detail });
    }

    resp.json().await.map_err(|e| ClientError {
      op,
      status: Some(status),
      detail: Some(e.to_string()),
    })
  }

  /// `GET /api/profiles`
  pub async fn list_profiles(&self) -> Result<Vec<Profile>, ClientError> {
    let envelope: ManyEnvelope = self
      .send(Operation::List, self.client.get(self.url("/profiles")))
      .await?;
    Ok(envelope.into())
  }

  /// `GET /api/profile/{id}`
  pub async fn get_profile(&self, id: &str) -> Result<Profile, ClientError> {
    let envelope: OneEnvelope = self
      .send(Operation::Fetch, self.client.get(self.url(&format!("/profile/{id}"))))
      .await?;
    Ok(envelope.into())
  }

  /// `POST /api/profiles`
  pub async fn create_profile(&self, input: &ProfileInput) -> Result<Profile, ClientError> {
    let req = self.client.post(self.url("/profiles")).json(input);
    let envelope: OneEnvelope = self.send(Operation::Create, req).await?;
    Ok(envelope.into())
  }

  /// `PATCH /api/profile/{id}`: only the fields set in `input` change.
  pub async fn update_profile(
    &self,
    id: &str,
    input: &ProfileInput,
  ) -> Result<Profile, ClientError> {
    let req = self.client.patch(self.url(&format!("/profile/{id}"))).json(input);
    let envelope: OneEnvelope = self.send(Operation::Update, req).await?;
    Ok(envelope.into())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use roster_store_sqlite::SqliteStore;
  use tokio::net::TcpListener;

  use super::*;

  async fn serve() -> ApiClient {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = axum::Router::new().nest("/api", roster_api::api_router(Arc::new(store)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    ApiClient::new(ApiConfig { base_url: format!("http://{addr}/") }).unwrap()
  }

  fn input(username: Option<&str>, email: Option<&str>, bio: Option<&str>) -> ProfileInput {
    ProfileInput {
      username: username.map(str::to_owned),
      email:    email.map(str::to_owned),
      bio:      bio.map(str::to_owned),
    }
  }

  // ── Envelope normalisation ───────────────────────────────────────────────

  #[test]
  fn wrapped_and_bare_single_profiles_match() {
    let wrapped: OneEnvelope = serde_json::from_str(
      r#"{"profile":{"id":3,"username":"mike_j","email":"m@x.com","created_at":"2025-03-10T09:15:00Z"}}"#,
    )
    .unwrap();
    let bare: OneEnvelope = serde_json::from_str(
      r#"{"id":"3","username":"mike_j","email":"m@x.com","bio":null,"created_at":"2025-03-10T09:15:00Z"}"#,
    )
    .unwrap();
    let (wrapped, bare): (Profile, Profile) = (wrapped.into(), bare.into());
    assert_eq!(wrapped, bare);
    assert_eq!(wrapped.id, "3");
  }

  #[test]
  fn wrapped_and_bare_lists_match() {
    let item = r#"{"id":1,"username":"john_doe","email":"j@x.com","created_at":"2025-01-15T10:30:00Z"}"#;
    let wrapped: ManyEnvelope =
      serde_json::from_str(&format!(r#"{{"profiles":[{item}]}}"#)).unwrap();
    let bare: ManyEnvelope = serde_json::from_str(&format!("[{item}]")).unwrap();
    let (wrapped, bare): (Vec<Profile>, Vec<Profile>) = (wrapped.into(), bare.into());
    assert_eq!(wrapped, bare);
    assert_eq!(wrapped.len(), 1);
  }

  #[test]
  fn error_body_prefers_single_error() {
    let body: ErrorBody = serde_json::from_str(r#"{"error":"Profile not found"}"#).unwrap();
    assert_eq!(body.into_detail().as_deref(), Some("Profile not found"));

    let body: ErrorBody = serde_json::from_str(
      r#"{"errors":[{"location":"body","field":"email","message":"Email must be valid"},
                    {"location":"body","field":"bio","message":"Bio must not exceed 1000 characters"}]}"#,
    )
    .unwrap();
    assert_eq!(
      body.into_detail().as_deref(),
      Some("Email must be valid; Bio must not exceed 1000 characters")
    );
  }

  #[test]
  fn messages_are_distinct_per_operation() {
    let ops = [Operation::List, Operation::Fetch, Operation::Create, Operation::Update];
    for (i, a) in ops.iter().enumerate() {
      for b in &ops[i + 1..] {
        assert_ne!(a.failure_message(), b.failure_message());
      }
    }
  }

  // ── Against a live router ────────────────────────────────────────────────

  #[tokio::test]
  async fn crud_round_trip() {
    let client = serve().await;
    assert!(client.list_profiles().await.unwrap().is_empty());

    let created = client
      .create_profile(&input(Some("alice123"), Some("a@x.com"), None))
      .await
      .unwrap();
    assert_eq!(created.username, "alice123");
    assert!(created.id.parse::<i64>().unwrap() > 0);

    let fetched = client.get_profile(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = client
      .update_profile(&created.id, &input(None, None, Some("hi")))
      .await
      .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("hi"));
    assert_eq!(updated.username, "alice123");

    let all = client.list_profiles().await.unwrap();
    assert_eq!(all, vec![updated]);
  }

  #[tokio::test]
  async fn duplicate_create_is_a_create_error() {
    let client = serve().await;
    let payload = input(Some("alice123"), Some("a@x.com"), None);
    client.create_profile(&payload).await.unwrap();

    let err = client.create_profile(&payload).await.unwrap_err();
    assert_eq!(err.op, Operation::Create);
    assert_eq!(err.status, Some(StatusCode::BAD_REQUEST));
    assert_eq!(err.to_string(), "Could not create the profile");
    assert_eq!(err.detail.as_deref(), Some("Username or email already exists"));
  }

  #[tokio::test]
  async fn missing_profile_is_a_fetch_error() {
    let client = serve().await;
    let err = client.get_profile("9999999").await.unwrap_err();
    assert_eq!(err.op, Operation::Fetch);
    assert_eq!(err.status, Some(StatusCode::NOT_FOUND));
    assert_eq!(err.describe(), "Could not load the profile: Profile not found");
  }

  #[tokio::test]
  async fn invalid_update_is_an_update_error() {
    let client = serve().await;
    let err = client
      .update_profile("1", &input(None, Some("not-an-email"), None))
      .await
      .unwrap_err();
    assert_eq!(err.op, Operation::Update);
    assert_eq!(err.detail.as_deref(), Some("Email must be valid"));
  }

  #[tokio::test]
  async fn unreachable_server_is_a_list_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(ApiConfig { base_url: format!("http://{addr}") }).unwrap();
    let err = client.list_profiles().await.unwrap_err();
    assert_eq!(err.op, Operation::List);
    assert_eq!(err.status, None);
    assert_eq!(err.to_string(), "Could not load profiles");
  }
}
