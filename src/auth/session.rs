//! Bearer-token session management.
//!
//! `SessionStore` is the single owner of the token: pages read it, attach it
//! to outbound requests, and mutate it only through the classification of a
//! completed request (`observe` -> `apply`). The token is persisted to a
//! fixed-name JSON file in the state directory so it survives restarts, the
//! same way the service's web client keeps it in browser local storage.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Session file name in the state directory
const SESSION_FILE: &str = "session.json";

/// Response header carrying a refreshed bearer token
pub const REFRESH_HEADER: &str = "x-jwt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub email: String,
    pub saved_at: DateTime<Utc>,
}

/// Session consequence of one completed (or failed) request.
///
/// Exactly one variant per outcome; `apply` performs the mutation each
/// variant prescribes. Network failures are deliberately distinct from
/// authentication failures: a dropped connection must never log the user
/// out, while a server-confirmed 401 always must.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Success response carrying a refreshed token; replaces the stored one.
    TokenRotated(String),
    /// The server rejected the token; the session must be cleared.
    Unauthenticated,
    /// Completed response with no session consequence.
    Unchanged,
    /// The request never completed; the session is untouched.
    RequestFailed(String),
}

/// Single source of truth for the bearer token.
///
/// Cloning shares the underlying cell, so background request tasks and the
/// app loop all see the same session. Writes are last-write-wins under the
/// lock.
#[derive(Clone)]
pub struct SessionStore {
    state_dir: PathBuf,
    cell: Arc<Mutex<Option<SessionData>>>,
}

impl SessionStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            state_dir,
            cell: Arc::new(Mutex::new(None)),
        }
    }

    /// Load a persisted session from disk. Returns true if one was found.
    pub fn load(&self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        *self.lock() = Some(data);
        Ok(true)
    }

    /// Current token, if any. Snapshot read with no side effects.
    pub fn token(&self) -> Option<String> {
        self.lock().as_ref().map(|d| d.token.clone())
    }

    /// Email the session was established for, if any.
    pub fn email(&self) -> Option<String> {
        self.lock().as_ref().map(|d| d.email.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// Start a session from a login success (token header + the email that
    /// authenticated).
    pub fn establish(&self, token: &str, email: &str) {
        let data = SessionData {
            token: token.to_string(),
            email: email.to_string(),
            saved_at: Utc::now(),
        };
        *self.lock() = Some(data);
        self.persist();
    }

    /// Replace the stored token, keeping the session's email. A rotation
    /// without an existing session still stores the token.
    pub fn set_token(&self, token: &str) {
        {
            let mut guard = self.lock();
            match guard.as_mut() {
                Some(data) => {
                    data.token = token.to_string();
                    data.saved_at = Utc::now();
                }
                None => {
                    *guard = Some(SessionData {
                        token: token.to_string(),
                        email: String::new(),
                        saved_at: Utc::now(),
                    });
                }
            }
        }
        self.persist();
    }

    /// Drop the session. Idempotent; clearing an empty store is a no-op.
    pub fn clear(&self) {
        *self.lock() = None;
        let path = self.session_path();
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(error = %e, "Failed to remove session file");
            }
        }
    }

    /// Add `Authorization: Bearer <token>` to an outbound request if a token
    /// is present; otherwise return the builder unchanged. Pure over current
    /// state.
    pub fn attach(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Classify a completed request outcome. No mutation happens here; the
    /// returned event says what `apply` must do.
    pub fn observe(
        &self,
        outcome: &Result<reqwest::Response, reqwest::Error>,
    ) -> SessionEvent {
        match outcome {
            Err(e) => SessionEvent::RequestFailed(e.to_string()),
            Ok(response) => {
                let status = response.status();
                if status == reqwest::StatusCode::UNAUTHORIZED {
                    return SessionEvent::Unauthenticated;
                }
                if status.is_success() {
                    if let Some(token) = response
                        .headers()
                        .get(REFRESH_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .filter(|v| !v.is_empty())
                    {
                        return SessionEvent::TokenRotated(token.to_string());
                    }
                }
                // Non-auth HTTP errors carry no session consequence; the
                // caller surfaces them through its own error channel.
                SessionEvent::Unchanged
            }
        }
    }

    /// Perform the mutation an event prescribes.
    pub fn apply(&self, event: &SessionEvent) {
        match event {
            SessionEvent::TokenRotated(token) => {
                debug!("Bearer token rotated");
                self.set_token(token);
            }
            SessionEvent::Unauthenticated => {
                debug!("Server rejected token, clearing session");
                self.clear();
            }
            SessionEvent::Unchanged | SessionEvent::RequestFailed(_) => {}
        }
    }

    /// Classify and apply in one step. Every authenticated call runs this
    /// unconditionally after dispatch, so token mutation happens in exactly
    /// one place.
    pub fn settle(
        &self,
        outcome: &Result<reqwest::Response, reqwest::Error>,
    ) -> SessionEvent {
        let event = self.observe(outcome);
        self.apply(&event);
        event
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionData>> {
        // A poisoned lock only means a panic mid-write of a plain Option;
        // the value itself is still coherent.
        self.cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self) {
        let snapshot = self.lock().clone();
        let Some(data) = snapshot else { return };
        if let Err(e) = self.write_session_file(&data) {
            warn!(error = %e, "Failed to persist session");
        }
    }

    fn write_session_file(&self, data: &SessionData) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }
}
