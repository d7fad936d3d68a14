//! Shape checks for incoming create/update/lookup requests.
//!
//! Validation never fails fast: every rule is evaluated and every violation
//! is collected, in field order, so a caller sees all problems at once.
//! Values are trimmed before any rule is applied and the trimmed form is what
//! a successful validation returns.

use serde::Serialize;
use thiserror::Error;
use validator::ValidateEmail as _;

use crate::profile::{NewProfile, ProfileId, ProfileInput, ProfilePatch};

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 255;
pub const BIO_MAX_CHARS: usize = 1000;

const USERNAME_REQUIRED: &str = "Username is required";
const USERNAME_LENGTH: &str = "Username must be between 3 and 255 characters";
const EMAIL_REQUIRED: &str = "Email is required";
const EMAIL_INVALID: &str = "Email must be valid";
const BIO_LENGTH: &str = "Bio must not exceed 1000 characters";
const ID_INVALID: &str = "ID must be a positive integer";

// ─── Error types ─────────────────────────────────────────────────────────────

/// Where the offending value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
  Body,
  Params,
}

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub location: Location,
  pub field:    &'static str,
  pub message:  &'static str,
}

/// Every rule a request violated, in the order the rules were checked.
/// Serialises as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("invalid input: {}", join_messages(.0))]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn errors(&self) -> &[FieldError] { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// First message reported for `field`, if any.
  pub fn first_for(&self, field: &str) -> Option<&'static str> {
    self.0.iter().find(|e| e.field == field).map(|e| e.message)
  }

  fn push(&mut self, location: Location, field: &'static str, message: &'static str) {
    self.0.push(FieldError { location, field, message });
  }
}

fn join_messages(errors: &[FieldError]) -> String {
  errors
    .iter()
    .map(|e| e.message)
    .collect::<Vec<_>>()
    .join("; ")
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Validate a path identifier for lookup.
pub fn validate_id(raw: &str) -> Result<ProfileId, ValidationErrors> {
  let mut errors = ValidationErrors::default();
  match check_id(raw, &mut errors) {
    Some(id) => Ok(id),
    None => Err(errors),
  }
}

/// Validate a create payload: `username` and `email` required, `bio`
/// optional.
pub fn validate_create(input: &ProfileInput) -> Result<NewProfile, ValidationErrors> {
  let mut errors = ValidationErrors::default();

  let username = check_username(input.username.as_deref(), true, &mut errors);
  let email = check_email(input.email.as_deref(), true, &mut errors);
  let bio = check_bio(input.bio.as_deref(), &mut errors);

  match (username, email) {
    (Some(username), Some(email)) if errors.is_empty() => Ok(NewProfile {
      username,
      email,
      bio: bio.flatten(),
    }),
    _ => Err(errors),
  }
}

/// Validate an update: the path id must be a positive integer and every
/// supplied body field obeys the same rule as on create.
pub fn validate_update(
  raw_id: &str,
  input: &ProfileInput,
) -> Result<(ProfileId, ProfilePatch), ValidationErrors> {
  let mut errors = ValidationErrors::default();

  let id = check_id(raw_id, &mut errors);
  let patch = ProfilePatch {
    username: check_username(input.username.as_deref(), false, &mut errors),
    email:    check_email(input.email.as_deref(), false, &mut errors),
    bio:      check_bio(input.bio.as_deref(), &mut errors),
  };

  match id {
    Some(id) if errors.is_empty() => Ok((id, patch)),
    _ => Err(errors),
  }
}

// ─── Field rules ─────────────────────────────────────────────────────────────

fn check_id(raw: &str, errors: &mut ValidationErrors) -> Option<ProfileId> {
  let digits = raw.strip_prefix('+').unwrap_or(raw);
  let parsed = if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
    digits.parse::<i64>().ok().and_then(ProfileId::new)
  } else {
    None
  };
  if parsed.is_none() {
    errors.push(Location::Params, "id", ID_INVALID);
  }
  parsed
}

fn check_username(
  raw: Option<&str>,
  required: bool,
  errors: &mut ValidationErrors,
) -> Option<String> {
  let value = match raw {
    Some(s) => s.trim(),
    None if required => "",
    None => return None,
  };

  let before = errors.0.len();
  if required && value.is_empty() {
    errors.push(Location::Body, "username", USERNAME_REQUIRED);
  }
  let len = value.chars().count();
  if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
    errors.push(Location::Body, "username", USERNAME_LENGTH);
  }
  (errors.0.len() == before).then(|| value.to_owned())
}

fn check_email(
  raw: Option<&str>,
  required: bool,
  errors: &mut ValidationErrors,
) -> Option<String> {
  let value = match raw {
    Some(s) => s.trim().to_owned(),
    None if required => String::new(),
    None => return None,
  };

  let before = errors.0.len();
  if required && value.is_empty() {
    errors.push(Location::Body, "email", EMAIL_REQUIRED);
  }
  if !value.validate_email() {
    errors.push(Location::Body, "email", EMAIL_INVALID);
  }
  (errors.0.len() == before).then_some(value)
}

/// `None` = not supplied; `Some(None)` = supplied but blank.
fn check_bio(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<Option<String>> {
  let value = raw?.trim();
  if value.chars().count() > BIO_MAX_CHARS {
    errors.push(Location::Body, "bio", BIO_LENGTH);
    return None;
  }
  Some((!value.is_empty()).then(|| value.to_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(username: Option<&str>, email: Option<&str>, bio: Option<&str>) -> ProfileInput {
    ProfileInput {
      username: username.map(str::to_owned),
      email:    email.map(str::to_owned),
      bio:      bio.map(str::to_owned),
    }
  }

  fn messages(errors: &ValidationErrors) -> Vec<&'static str> {
    errors.errors().iter().map(|e| e.message).collect()
  }

  // ── create ────────────────────────────────────────────────────────────────

  #[test]
  fn create_trims_and_normalises() {
    let new = validate_create(&input(
      Some("  alice123 "),
      Some(" a@x.com\t"),
      Some("  hello  "),
    ))
    .unwrap();
    assert_eq!(new.username, "alice123");
    assert_eq!(new.email, "a@x.com");
    assert_eq!(new.bio.as_deref(), Some("hello"));
  }

  #[test]
  fn create_blank_bio_becomes_none() {
    let new = validate_create(&input(Some("alice123"), Some("a@x.com"), Some("   "))).unwrap();
    assert_eq!(new.bio, None);
  }

  #[test]
  fn create_missing_everything_reports_every_rule() {
    let err = validate_create(&ProfileInput::default()).unwrap_err();
    assert_eq!(
      messages(&err),
      vec![USERNAME_REQUIRED, USERNAME_LENGTH, EMAIL_REQUIRED, EMAIL_INVALID]
    );
    assert!(err.errors().iter().all(|e| e.location == Location::Body));
  }

  #[test]
  fn create_collects_errors_across_fields() {
    let long_bio = "x".repeat(BIO_MAX_CHARS + 1);
    let err = validate_create(&input(Some("ab"), Some("invalid-email"), Some(&long_bio)))
      .unwrap_err();
    assert_eq!(messages(&err), vec![USERNAME_LENGTH, EMAIL_INVALID, BIO_LENGTH]);
    assert_eq!(err.first_for("bio"), Some(BIO_LENGTH));
  }

  #[test]
  fn username_length_counts_characters_not_bytes() {
    // Three characters, nine bytes.
    assert!(validate_create(&input(Some("日本語"), Some("a@x.com"), None)).is_ok());
    let too_long = "é".repeat(USERNAME_MAX_CHARS + 1);
    assert!(validate_create(&input(Some(&too_long), Some("a@x.com"), None)).is_err());
    let max = "é".repeat(USERNAME_MAX_CHARS);
    assert!(validate_create(&input(Some(&max), Some("a@x.com"), None)).is_ok());
  }

  #[test]
  fn bio_at_limit_is_accepted() {
    let bio = "b".repeat(BIO_MAX_CHARS);
    assert!(validate_create(&input(Some("alice123"), Some("a@x.com"), Some(&bio))).is_ok());
  }

  // ── update ────────────────────────────────────────────────────────────────

  #[test]
  fn update_with_only_bio() {
    let (id, patch) = validate_update("5", &input(None, None, Some("hi"))).unwrap();
    assert_eq!(id.get(), 5);
    assert_eq!(patch.username, None);
    assert_eq!(patch.email, None);
    assert_eq!(patch.bio, Some(Some("hi".to_owned())));
  }

  #[test]
  fn update_empty_body_is_valid() {
    let (_, patch) = validate_update("1", &ProfileInput::default()).unwrap();
    assert!(patch.is_empty());
  }

  #[test]
  fn update_supplied_fields_follow_create_rules() {
    let err = validate_update("1", &input(Some("  x "), Some("nope"), None)).unwrap_err();
    assert_eq!(messages(&err), vec![USERNAME_LENGTH, EMAIL_INVALID]);
  }

  #[test]
  fn update_reports_bad_id_alongside_body_errors() {
    let err = validate_update("abc", &input(Some("x"), None, None)).unwrap_err();
    assert_eq!(messages(&err), vec![ID_INVALID, USERNAME_LENGTH]);
    assert_eq!(err.errors()[0].location, Location::Params);
    assert_eq!(err.errors()[0].field, "id");
  }

  // ── id ────────────────────────────────────────────────────────────────────

  #[test]
  fn id_must_be_positive_integer() {
    assert_eq!(validate_id("42").unwrap().get(), 42);
    assert_eq!(validate_id("+7").unwrap().get(), 7);
    assert_eq!(validate_id("007").unwrap().get(), 7);
    for bad in ["", "0", "-1", "1.5", "abc", " 3", "+", "99999999999999999999"] {
      assert!(validate_id(bad).is_err(), "{bad:?} should be rejected");
    }
  }

  #[test]
  fn errors_serialise_as_array() {
    let err = validate_id("nope").unwrap_err();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(
      json,
      serde_json::json!([
        { "location": "params", "field": "id", "message": ID_INVALID }
      ])
    );
  }
}
