//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use crate::{
  client::{ApiClient, ClientError, Profile},
  form::{FormAction, FormMode, ProfileForm},
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the profile list; right pane shows the selection, if any.
  ProfileList,
  /// Focus on the profile detail pane.
  ProfileDetail,
  /// A create or edit form occupies the right pane.
  Form,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Profiles from the last successful list request.
  pub profiles: Vec<Profile>,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* profile list.
  pub list_cursor: usize,

  /// Profile shown in the detail pane, as last fetched.
  pub selected: Option<Profile>,

  /// Open create/edit form.
  pub form: Option<ProfileForm>,

  /// Set while a request is in flight.
  pub loading: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  /// Create an [`App`] with an empty profile list.
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::ProfileList,
      profiles: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      selected: None,
      form: None,
      loading: false,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch all profiles. On failure the previous list is kept and the error
  /// goes to the status bar.
  pub async fn load_profiles(&mut self) {
    self.loading = true;
    let result = self.client.list_profiles().await;
    self.loading = false;
    match result {
      Ok(profiles) => {
        self.profiles = profiles;
        self.list_cursor = self.list_cursor.min(self.profiles.len().saturating_sub(1));
        self.status_msg = format!("{} profiles", self.profiles.len());
      }
      Err(e) => self.report(&e),
    }
  }

  /// Fetch a single profile and show it in the detail pane.
  async fn open_detail(&mut self, id: &str) {
    self.loading = true;
    let result = self.client.get_profile(id).await;
    self.loading = false;
    match result {
      Ok(profile) => {
        self.selected = Some(profile);
        self.screen = Screen::ProfileDetail;
        self.status_msg.clear();
      }
      Err(e) => self.report(&e),
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Returns profiles whose username or email match the filter query.
  pub fn filtered_profiles(&self) -> Vec<&Profile> {
    if self.filter.is_empty() {
      return self.profiles.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .profiles
      .iter()
      .filter(|p| {
        matcher.fuzzy_match(&p.username, &self.filter).is_some()
          || matcher.fuzzy_match(&p.email, &self.filter).is_some()
      })
      .collect()
  }

  /// The profile under the list cursor in the filtered view, if any.
  pub fn cursor_profile(&self) -> Option<&Profile> {
    self.filtered_profiles().get(self.list_cursor).copied()
  }

  fn cursor_id(&self) -> Option<String> {
    self.cursor_profile().map(|p| p.id.clone())
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.filter_active {
      self.handle_filter_key(key).await;
      return true;
    }

    match self.screen {
      Screen::ProfileList => self.handle_list_key(key).await,
      Screen::ProfileDetail => self.handle_detail_key(key).await,
      Screen::Form => {
        self.handle_form_key(key).await;
        true
      }
    }
  }

  async fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Open straight away if there's exactly one match.
        let only = match self.filtered_profiles().as_slice() {
          [one] => Some(one.id.clone()),
          _ => None,
        };
        if let Some(id) = only {
          self.open_detail(&id).await;
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => self.cursor_down(),
      KeyCode::Up | KeyCode::Char('k') => self.cursor_up(),

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_id() {
          self.open_detail(&id).await;
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('r') => self.load_profiles().await,
      KeyCode::Char('n') => self.open_form(ProfileForm::create()),
      KeyCode::Char('e') => {
        if let Some(profile) = self.cursor_profile() {
          let form = ProfileForm::edit(profile);
          self.open_form(form);
        }
      }

      _ => {}
    }
    true
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::ProfileList;
        self.selected = None;
      }

      // Quick switching without leaving the detail pane.
      KeyCode::Down | KeyCode::Char('j') | KeyCode::Char(']') => {
        self.cursor_down();
        if let Some(id) = self.cursor_id() {
          self.open_detail(&id).await;
        }
      }
      KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('[') => {
        self.cursor_up();
        if let Some(id) = self.cursor_id() {
          self.open_detail(&id).await;
        }
      }

      KeyCode::Char('r') => {
        if let Some(id) = self.selected.as_ref().map(|p| p.id.clone()) {
          self.open_detail(&id).await;
        }
      }
      KeyCode::Char('n') => self.open_form(ProfileForm::create()),
      KeyCode::Char('e') => {
        if let Some(profile) = &self.selected {
          let form = ProfileForm::edit(profile);
          self.open_form(form);
        }
      }

      _ => {}
    }
    true
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    let Some(form) = self.form.as_mut() else {
      self.screen = Screen::ProfileList;
      return;
    };

    match form.handle_key(key) {
      FormAction::Continue => {}
      FormAction::Cancel => self.close_form(),
      FormAction::Submit => {
        let Some(input) = form.submit() else {
          self.status_msg = "Fix the highlighted fields".into();
          return;
        };
        let mode = form.mode.clone();

        self.loading = true;
        let result = match &mode {
          FormMode::Create => self.client.create_profile(&input).await,
          FormMode::Edit(original) if input == Default::default() => Ok(original.clone()),
          FormMode::Edit(original) => self.client.update_profile(&original.id, &input).await,
        };
        self.loading = false;

        match result {
          Ok(saved) => {
            self.status_msg = match mode {
              FormMode::Create => format!("Created {}", saved.username),
              FormMode::Edit(_) => format!("Saved {}", saved.username),
            };
            self.form = None;
            self.select_saved(saved).await;
          }
          // Keep the form open so nothing typed is lost.
          Err(e) => self.report(&e),
        }
      }
    }
  }

  fn report(&mut self, e: &ClientError) {
    tracing::warn!(op = ?e.op, status = ?e.status, detail = ?e.detail, "request failed");
    self.status_msg = e.describe();
  }

  fn open_form(&mut self, form: ProfileForm) {
    self.form = Some(form);
    self.screen = Screen::Form;
    self.status_msg.clear();
  }

  fn close_form(&mut self) {
    self.form = None;
    self.screen = if self.selected.is_some() {
      Screen::ProfileDetail
    } else {
      Screen::ProfileList
    };
  }

  /// Refresh the list and put the cursor on the profile just saved.
  async fn select_saved(&mut self, saved: Profile) {
    let status = std::mem::take(&mut self.status_msg);
    self.filter.clear();
    self.load_profiles().await;
    if let Some(pos) = self.profiles.iter().position(|p| p.id == saved.id) {
      self.list_cursor = pos;
      self.status_msg = status;
    }
    self.selected = Some(saved);
    self.screen = Screen::ProfileDetail;
  }

  fn cursor_down(&mut self) {
    let len = self.filtered_profiles().len();
    if len > 0 && self.list_cursor + 1 < len {
      self.list_cursor += 1;
    }
  }

  fn cursor_up(&mut self) {
    self.list_cursor = self.list_cursor.saturating_sub(1);
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::client::ApiConfig;

  fn app_with(names: &[(&str, &str)]) -> App {
    let client = ApiClient::new(ApiConfig { base_url: "http://127.0.0.1:9".into() }).unwrap();
    let mut app = App::new(client);
    app.profiles = names
      .iter()
      .enumerate()
      .map(|(i, (username, email))| Profile {
        id:         (i + 1).to_string(),
        username:   (*username).into(),
        email:      (*email).into(),
        bio:        None,
        created_at: Utc::now(),
      })
      .collect();
    app
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  #[test]
  fn filter_matches_username_or_email() {
    let mut app = app_with(&[
      ("john_doe", "john@example.com"),
      ("jane_smith", "jane@example.com"),
      ("mike_j", "mike@corp.io"),
    ]);
    app.filter = "corp".into();
    let hits: Vec<_> = app.filtered_profiles().iter().map(|p| p.username.as_str()).collect();
    assert_eq!(hits, ["mike_j"]);

    app.filter = "jane".into();
    assert_eq!(app.cursor_profile().map(|p| p.id.as_str()), Some("2"));
  }

  #[tokio::test]
  async fn cursor_stays_in_bounds() {
    let mut app = app_with(&[("john_doe", "j@x.com"), ("jane_smith", "s@x.com")]);
    assert!(app.handle_key(key(KeyCode::Up)).await);
    assert_eq!(app.list_cursor, 0);
    app.handle_key(key(KeyCode::Char('j'))).await;
    app.handle_key(key(KeyCode::Char('j'))).await;
    assert_eq!(app.list_cursor, 1);
  }

  #[tokio::test]
  async fn quit_keys() {
    let mut app = app_with(&[]);
    assert!(!app.handle_key(key(KeyCode::Char('q'))).await);
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(!app.handle_key(ctrl_c).await);
  }

  #[tokio::test]
  async fn typing_q_in_filter_does_not_quit() {
    let mut app = app_with(&[("john_doe", "j@x.com")]);
    app.handle_key(key(KeyCode::Char('/'))).await;
    assert!(app.handle_key(key(KeyCode::Char('q'))).await);
    assert_eq!(app.filter, "q");
    app.handle_key(key(KeyCode::Esc)).await;
    assert!(!app.filter_active);
    assert!(app.filter.is_empty());
  }

  #[tokio::test]
  async fn new_and_edit_open_forms_and_esc_returns() {
    let mut app = app_with(&[("john_doe", "j@x.com")]);
    app.handle_key(key(KeyCode::Char('n'))).await;
    assert_eq!(app.screen, Screen::Form);
    assert_eq!(app.form.as_ref().map(|f| &f.mode), Some(&FormMode::Create));
    app.handle_key(key(KeyCode::Esc)).await;
    assert_eq!(app.screen, Screen::ProfileList);
    assert!(app.form.is_none());

    app.handle_key(key(KeyCode::Char('e'))).await;
    assert!(matches!(
      app.form.as_ref().map(|f| &f.mode),
      Some(FormMode::Edit(p)) if p.username == "john_doe"
    ));
  }

  #[tokio::test]
  async fn invalid_form_stays_open_without_a_request() {
    let mut app = app_with(&[]);
    app.handle_key(key(KeyCode::Char('n'))).await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.screen, Screen::Form);
    assert_eq!(app.status_msg, "Fix the highlighted fields");
  }

  #[tokio::test]
  async fn unchanged_edit_skips_the_request() {
    let mut app = app_with(&[("john_doe", "j@x.com")]);
    app.handle_key(key(KeyCode::Char('e'))).await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.screen, Screen::ProfileDetail);
    assert_eq!(app.selected.as_ref().map(|p| p.username.as_str()), Some("john_doe"));
  }
}
