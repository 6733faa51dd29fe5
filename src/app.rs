//! Application state management for accterm.
//!
//! The `App` struct owns the screen state, the form fields, and the
//! background request plumbing. Requests run on spawned tasks and report
//! back over an mpsc channel; a cancellation token tied to navigation
//! abandons any in-flight request when the user leaves the screen that
//! started it, so a stale response can neither touch the session nor the UI.

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{CredentialStore, SessionStore};
use crate::config::Config;
use crate::models::{Account, ProfileUpdate};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// One request is in flight at a time; 8 leaves headroom for quick restarts.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for email input.
pub const MAX_EMAIL_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the display-name field.
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length for the birth-date field (free-form string).
pub const MAX_BIRTH_LENGTH: usize = 32;

/// Maximum length for the about field.
pub const MAX_ABOUT_LENGTH: usize = 500;

/// Minimum password length accepted at signup (the server enforces the
/// same floor).
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ============================================================================
// UI State Types
// ============================================================================

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Signup,
    Profile,
}

/// Overall application state (overlays on top of the current screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Editing,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Signup form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupFocus {
    Email,
    Password,
    Confirm,
    Button,
}

/// Edit dialog focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditFocus {
    Name,
    Birth,
    About,
    Confirm,
    Cancel,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results delivered from background request tasks back to the app loop.
enum TaskResult {
    Login(Result<(), ApiError>),
    Signup(Result<(), ApiError>),
    Profile(Result<Account, ApiError>),
    Edit {
        outcome: Result<(), ApiError>,
        update: ProfileUpdate,
    },
}

// ============================================================================
// Input guards
// ============================================================================

/// Whether a character may be appended to an email field.
/// Email addresses carry no whitespace, so it is rejected at input time
/// rather than trimmed later.
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && !c.is_control() && !c.is_whitespace()
}

/// Whether a character may be appended to a password field.
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && !c.is_control() && !c.is_whitespace()
}

/// Whether a character may be appended to a free-form text field.
/// Interior spaces are fine; the value is trimmed at submit.
pub fn can_add_text_char(current_len: usize, c: char, max_len: usize) -> bool {
    current_len < max_len && !c.is_control()
}

/// Cheap shape check for an email address: one `@`, a non-empty local part,
/// and a dot somewhere after it. The server applies the real rules.
pub fn is_plausible_email(s: &str) -> bool {
    let mut parts = s.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let Some(domain) = parts.next() else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Client-side login validation. Returns the message to display, or None if
/// the form may be submitted.
pub fn validate_login(email: &str, password: &str) -> Option<String> {
    if email.is_empty() || password.is_empty() {
        return Some("Email and password are required.".to_string());
    }
    None
}

/// Client-side signup validation. Returns the message to display, or None if
/// the form may be submitted.
pub fn validate_signup(email: &str, password: &str, confirm: &str) -> Option<String> {
    if email.is_empty() || password.is_empty() || confirm.is_empty() {
        return Some("All fields are required.".to_string());
    }
    if !is_plausible_email(email) {
        return Some("That does not look like an email address.".to_string());
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Some(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if password != confirm {
        return Some("Passwords do not match.".to_string());
    }
    None
}

// ============================================================================
// App
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,

    // Screen state
    pub screen: Screen,
    pub state: AppState,

    // Login form
    pub login_email: String,
    pub login_password: String,
    pub login_show_password: bool,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Signup form
    pub signup_email: String,
    pub signup_password: String,
    pub signup_confirm: String,
    pub signup_show_password: bool,
    pub signup_focus: SignupFocus,
    pub signup_error: Option<String>,

    // Profile screen
    pub account: Account,
    pub profile_loading: bool,
    pub profile_error: Option<String>,

    // Edit dialog
    pub edit_name: String,
    pub edit_birth: String,
    pub edit_about: String,
    pub edit_focus: EditFocus,

    /// One request in flight per screen; gates the submitting control.
    pub busy: bool,

    /// Transient notice shown in the status bar.
    pub status_message: Option<String>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    /// Cancelled and replaced on every navigation; in-flight requests hold a
    /// clone and die with it.
    nav_token: CancellationToken,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let state_dir = Config::state_dir()?;
        let session = SessionStore::new(state_dir);
        match session.load() {
            Ok(found) => debug!(found, "Session storage checked"),
            Err(e) => warn!(error = %e, "Failed to load persisted session"),
        }

        let api = ApiClient::new(config.api_url(), session.clone())?;

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill the login form for a returning user
        let login_email = config.last_email.clone().unwrap_or_default();
        let login_password = if !login_email.is_empty()
            && CredentialStore::has_credentials(&login_email)
        {
            CredentialStore::get_password(&login_email).unwrap_or_default()
        } else {
            String::new()
        };

        let screen = if session.is_authenticated() {
            Screen::Profile
        } else {
            Screen::Login
        };

        let login_focus = if login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };

        Ok(Self {
            config,
            session,
            api,

            screen,
            state: AppState::Normal,

            login_email,
            login_password,
            login_show_password: false,
            login_focus,
            login_error: None,

            signup_email: String::new(),
            signup_password: String::new(),
            signup_confirm: String::new(),
            signup_show_password: false,
            signup_focus: SignupFocus::Email,
            signup_error: None,

            account: Account::default(),
            profile_loading: false,
            profile_error: None,

            edit_name: String::new(),
            edit_birth: String::new(),
            edit_about: String::new(),
            edit_focus: EditFocus::Name,

            busy: false,
            status_message: None,

            task_rx,
            task_tx,

            nav_token: CancellationToken::new(),
        })
    }

    /// Kick off the work the initial screen needs (called once after setup).
    pub fn start(&mut self) {
        if self.screen == Screen::Profile {
            self.dispatch_profile_fetch();
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch screens. Abandons any in-flight request and resets transient
    /// screen state; whatever that request would have done to the session or
    /// the UI no longer happens.
    pub fn navigate(&mut self, screen: Screen) {
        self.nav_token.cancel();
        self.nav_token = CancellationToken::new();
        self.busy = false;
        self.profile_loading = false;
        self.login_error = None;
        self.signup_error = None;
        self.profile_error = None;
        self.status_message = None;
        self.screen = screen;
        self.state = AppState::Normal;

        match screen {
            Screen::Login => {
                self.login_show_password = false;
                self.login_focus = if self.login_email.is_empty() {
                    LoginFocus::Email
                } else {
                    LoginFocus::Password
                };
            }
            Screen::Signup => {
                self.signup_show_password = false;
                self.signup_focus = SignupFocus::Email;
            }
            Screen::Profile => {
                self.dispatch_profile_fetch();
            }
        }
    }

    // =========================================================================
    // Request dispatch
    // =========================================================================

    fn spawn_request<F>(&self, fut: F)
    where
        F: std::future::Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        let cancel = self.nav_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("In-flight request abandoned by navigation");
                }
                result = fut => {
                    let _ = tx.send(result).await;
                }
            }
        });
    }

    /// Submit the login form. No-op while a request is already in flight.
    pub fn attempt_login(&mut self) {
        if self.busy {
            return;
        }
        if let Some(message) = validate_login(&self.login_email, &self.login_password) {
            self.login_error = Some(message);
            return;
        }
        self.login_error = None;
        self.status_message = None;
        self.busy = true;

        let api = self.api.clone();
        let email = self.login_email.clone();
        let password = self.login_password.clone();
        self.spawn_request(async move { TaskResult::Login(api.login(&email, &password).await) });
    }

    /// Submit the signup form. No-op while a request is already in flight.
    pub fn attempt_signup(&mut self) {
        if self.busy {
            return;
        }
        if let Some(message) = validate_signup(
            &self.signup_email,
            &self.signup_password,
            &self.signup_confirm,
        ) {
            self.signup_error = Some(message);
            return;
        }
        self.signup_error = None;
        self.busy = true;

        let api = self.api.clone();
        let email = self.signup_email.clone();
        let password = self.signup_password.clone();
        let confirm = self.signup_confirm.clone();
        self.spawn_request(async move {
            TaskResult::Signup(api.signup(&email, &password, &confirm).await)
        });
    }

    fn dispatch_profile_fetch(&mut self) {
        self.profile_loading = true;
        let api = self.api.clone();
        self.spawn_request(async move { TaskResult::Profile(api.fetch_profile().await) });
    }

    /// Reload the profile on request. No-op while a fetch is in flight.
    pub fn refresh_profile(&mut self) {
        if !self.profile_loading && !self.busy {
            self.profile_error = None;
            self.dispatch_profile_fetch();
        }
    }

    /// Open the edit dialog seeded with the current account values.
    pub fn open_edit_dialog(&mut self) {
        self.edit_name = self.account.name.clone();
        self.edit_birth = self.account.birth.clone();
        self.edit_about = self.account.about.clone();
        self.edit_focus = EditFocus::Name;
        self.state = AppState::Editing;
    }

    /// Close the edit dialog without saving.
    pub fn cancel_edit(&mut self) {
        self.state = AppState::Normal;
    }

    /// Submit the edit dialog. Closes the dialog and sends the update; the
    /// profile screen shows the outcome.
    pub fn submit_edit(&mut self) {
        if self.busy {
            return;
        }
        let update = ProfileUpdate {
            name: self.edit_name.trim().to_string(),
            birth: self.edit_birth.trim().to_string(),
            about: self.edit_about.trim().to_string(),
        };
        self.state = AppState::Normal;
        self.profile_error = None;
        self.busy = true;

        let api = self.api.clone();
        self.spawn_request(async move {
            let outcome = api.edit_profile(&update).await;
            TaskResult::Edit { outcome, update }
        });
    }

    /// Explicit logout: drop the session and the stored credential, back to
    /// the login screen.
    pub fn logout(&mut self) {
        self.session.clear();
        if let Some(email) = self.config.last_email.clone() {
            if let Err(e) = CredentialStore::delete(&email) {
                warn!(error = %e, "Failed to delete stored credential");
            }
        }
        self.login_password.clear();
        self.account = Account::default();
        self.navigate(Screen::Login);
        self.status_message = Some("Signed out.".to_string());
        info!("Logged out");
    }

    // =========================================================================
    // Background task results
    // =========================================================================

    /// Drain completed background tasks and fold their outcomes into the
    /// app state. Called from the event loop between input polls.
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.task_rx.try_recv() {
            match result {
                TaskResult::Login(outcome) => self.on_login_result(outcome),
                TaskResult::Signup(outcome) => self.on_signup_result(outcome),
                TaskResult::Profile(outcome) => self.on_profile_result(outcome),
                TaskResult::Edit { outcome, update } => self.on_edit_result(outcome, update),
            }
        }
    }

    fn on_login_result(&mut self, outcome: Result<(), ApiError>) {
        self.busy = false;
        match outcome {
            Ok(()) => {
                info!("Login successful");
                if let Err(e) = CredentialStore::store(&self.login_email, &self.login_password) {
                    warn!(error = %e, "Failed to store credentials");
                }
                self.config.last_email = Some(self.login_email.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.login_password.clear();
                self.navigate(Screen::Profile);
            }
            Err(e) => {
                debug!(error = %e, "Login failed");
                self.login_error = Some(Self::action_error_message(
                    &e,
                    "Failed to sign in. Check your email and password.",
                ));
            }
        }
    }

    fn on_signup_result(&mut self, outcome: Result<(), ApiError>) {
        self.busy = false;
        match outcome {
            Ok(()) => {
                info!("Signup successful");
                self.login_email = self.signup_email.clone();
                self.login_password.clear();
                self.signup_email.clear();
                self.signup_password.clear();
                self.signup_confirm.clear();
                self.navigate(Screen::Login);
                self.status_message = Some("Account created. Please sign in.".to_string());
            }
            Err(e) => {
                debug!(error = %e, "Signup failed");
                self.signup_error = Some(Self::action_error_message(
                    &e,
                    "Failed to sign up. The email may already be registered.",
                ));
            }
        }
    }

    fn on_profile_result(&mut self, outcome: Result<Account, ApiError>) {
        self.profile_loading = false;
        match outcome {
            Ok(account) => {
                self.account = account;
            }
            Err(e) if e.is_network() => {
                // A dropped connection is not a verdict on the session: keep
                // the token, stay on the profile, try again on next entry.
                debug!(error = %e, "Profile fetch failed (network)");
            }
            Err(e) => {
                // The initial-load contract: any completed-but-unsuccessful
                // response retires the session and returns to login without
                // an inline message. A 401 has already cleared the token in
                // the settle step; other statuses clear it here.
                debug!(error = %e, "Profile fetch rejected, returning to login");
                self.session.clear();
                self.navigate(Screen::Login);
            }
        }
    }

    fn on_edit_result(&mut self, outcome: Result<(), ApiError>, update: ProfileUpdate) {
        self.busy = false;
        match outcome {
            Ok(()) => {
                self.account.apply_update(&update);
                self.profile_error = None;
            }
            Err(ApiError::Unauthorized) => {
                // Token already cleared by the settle step
                self.navigate(Screen::Login);
                self.login_error = Some("Session expired. Please sign in again.".to_string());
            }
            Err(e) if e.is_network() => {
                self.profile_error =
                    Some("Unable to reach the server. Check your connection.".to_string());
            }
            Err(e) => {
                debug!(error = %e, "Edit failed");
                self.profile_error = Some("Failed to save changes.".to_string());
            }
        }
    }

    /// User-facing message for a failed explicit action.
    fn action_error_message(error: &ApiError, rejected: &str) -> String {
        match error {
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to reach the server. Check your connection.".to_string()
            }
            ApiError::ServerError(_) => "Server error. Please try again later.".to_string(),
            ApiError::InvalidResponse(msg) if msg.contains("no token") => {
                "Sign-in succeeded but no token was returned.".to_string()
            }
            _ => rejected.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Input guard tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(MAX_EMAIL_LENGTH - 1, '@'));
        // At the cap
        assert!(!can_add_email_char(MAX_EMAIL_LENGTH, 'a'));
        // Whitespace and control characters rejected
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\t'));
        assert!(!can_add_email_char(0, '\x00'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(MAX_PASSWORD_LENGTH - 1, '!'));
        assert!(!can_add_password_char(MAX_PASSWORD_LENGTH, 'a'));
        assert!(!can_add_password_char(0, ' '));
        assert!(!can_add_password_char(0, '\n'));
    }

    #[test]
    fn test_can_add_text_char_allows_spaces() {
        assert!(can_add_text_char(0, ' ', MAX_NAME_LENGTH));
        assert!(can_add_text_char(5, 'x', MAX_NAME_LENGTH));
        assert!(!can_add_text_char(MAX_NAME_LENGTH, 'x', MAX_NAME_LENGTH));
        assert!(!can_add_text_char(0, '\x1b', MAX_NAME_LENGTH));
    }

    // -------------------------------------------------------------------------
    // Validation tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_is_plausible_email() {
        assert!(is_plausible_email("a@b.com"));
        assert!(is_plausible_email("first.last@sub.domain.org"));

        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("no-at-sign"));
        assert!(!is_plausible_email("@missing-local.com"));
        assert!(!is_plausible_email("a@nodot"));
        assert!(!is_plausible_email("a@.starts-with-dot"));
        assert!(!is_plausible_email("a@ends-with-dot."));
        assert!(!is_plausible_email("a@b@c.com"));
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login("a@b.com", "secret1!").is_none());
        assert!(validate_login("", "secret1!").is_some());
        assert!(validate_login("a@b.com", "").is_some());
    }

    #[test]
    fn test_validate_signup() {
        assert!(validate_signup("a@b.com", "secret1!", "secret1!").is_none());

        // Empty fields
        assert!(validate_signup("", "secret1!", "secret1!").is_some());
        assert!(validate_signup("a@b.com", "", "").is_some());

        // Bad email shape
        assert!(validate_signup("not-an-email", "secret1!", "secret1!").is_some());

        // Too short
        assert!(validate_signup("a@b.com", "short", "short").is_some());

        // Mismatch
        let message = validate_signup("a@b.com", "secret1!", "secret2!")
            .expect("mismatched passwords should be rejected");
        assert!(message.contains("match"));
    }
}
