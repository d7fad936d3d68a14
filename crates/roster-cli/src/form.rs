//! Create / edit form state.
//!
//! The form owns plain text buffers for each field. On submit it builds a
//! [`ProfileInput`] and runs the same rules the server applies, so most
//! mistakes are caught before a request is made. When editing, only fields
//! whose text differs from the loaded profile are sent.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use roster_core::{FieldError, ProfileInput, validate};

use crate::client::Profile;

// ─── Fields ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Username,
  Email,
  Bio,
}

impl Field {
  pub const ALL: [Field; 3] = [Field::Username, Field::Email, Field::Bio];

  pub fn label(self) -> &'static str {
    match self {
      Self::Username => "Username",
      Self::Email => "Email",
      Self::Bio => "Bio",
    }
  }

  /// Field name as reported by validation.
  fn key(self) -> &'static str {
    match self {
      Self::Username => "username",
      Self::Email => "email",
      Self::Bio => "bio",
    }
  }

  fn next(self) -> Self {
    match self {
      Self::Username => Self::Email,
      Self::Email => Self::Bio,
      Self::Bio => Self::Username,
    }
  }

  fn prev(self) -> Self {
    match self {
      Self::Username => Self::Bio,
      Self::Email => Self::Username,
      Self::Bio => Self::Email,
    }
  }
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
  Create,
  /// Editing the contained profile as it was when the form opened.
  Edit(Profile),
}

/// What the app should do after a key press in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
  Continue,
  Submit,
  Cancel,
}

#[derive(Debug, Clone)]
pub struct ProfileForm {
  pub mode:  FormMode,
  pub focus: Field,
  username:  String,
  email:     String,
  bio:       String,
  errors:    Vec<FieldError>,
}

impl ProfileForm {
  pub fn create() -> Self {
    Self {
      mode:     FormMode::Create,
      focus:    Field::Username,
      username: String::new(),
      email:    String::new(),
      bio:      String::new(),
      errors:   Vec::new(),
    }
  }

  /// A form prefilled with `profile`'s current values.
  pub fn edit(profile: &Profile) -> Self {
    Self {
      mode:     FormMode::Edit(profile.clone()),
      focus:    Field::Username,
      username: profile.username.clone(),
      email:    profile.email.clone(),
      bio:      profile.bio.clone().unwrap_or_default(),
      errors:   Vec::new(),
    }
  }

  pub fn value(&self, field: Field) -> &str {
    match field {
      Field::Username => &self.username,
      Field::Email => &self.email,
      Field::Bio => &self.bio,
    }
  }

  fn value_mut(&mut self, field: Field) -> &mut String {
    match field {
      Field::Username => &mut self.username,
      Field::Email => &mut self.email,
      Field::Bio => &mut self.bio,
    }
  }

  /// First local validation message for `field`.
  pub fn error(&self, field: Field) -> Option<&'static str> {
    self
      .errors
      .iter()
      .find(|e| e.field == field.key())
      .map(|e| e.message)
  }

  /// Messages not tied to an editable field (a bad profile id).
  pub fn other_errors(&self) -> impl Iterator<Item = &'static str> + '_ {
    self
      .errors
      .iter()
      .filter(|e| Field::ALL.iter().all(|f| f.key() != e.field))
      .map(|e| e.message)
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
    match key.code {
      KeyCode::Esc => return FormAction::Cancel,
      KeyCode::Enter => return FormAction::Submit,
      KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
      KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
      KeyCode::Backspace => {
        self.value_mut(self.focus).pop();
        self.clear_error(self.focus);
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.value_mut(self.focus).push(c);
        self.clear_error(self.focus);
      }
      _ => {}
    }
    FormAction::Continue
  }

  fn clear_error(&mut self, field: Field) {
    self.errors.retain(|e| e.field != field.key());
  }

  /// The request body the form currently describes.
  pub fn input(&self) -> ProfileInput {
    match &self.mode {
      FormMode::Create => ProfileInput {
        username: Some(self.username.clone()),
        email:    Some(self.email.clone()),
        bio:      (!self.bio.is_empty()).then(|| self.bio.clone()),
      },
      FormMode::Edit(original) => {
        let changed = |now: &str, before: &str| (now != before).then(|| now.to_owned());
        ProfileInput {
          username: changed(&self.username, &original.username),
          email:    changed(&self.email, &original.email),
          bio:      changed(&self.bio, original.bio.as_deref().unwrap_or_default()),
        }
      }
    }
  }

  /// Build the request body and check it locally. On failure the messages
  /// are kept for display and `None` is returned.
  pub fn submit(&mut self) -> Option<ProfileInput> {
    let input = self.input();
    let outcome = match &self.mode {
      FormMode::Create => validate::validate_create(&input).map(drop),
      FormMode::Edit(original) => validate::validate_update(&original.id, &input).map(drop),
    };
    match outcome {
      Ok(()) => {
        self.errors.clear();
        Some(input)
      }
      Err(errors) => {
        self.errors = errors.errors().to_vec();
        if let Some(first) = Field::ALL.into_iter().find(|f| self.error(*f).is_some()) {
          self.focus = first;
        }
        None
      }
    }
  }
}
