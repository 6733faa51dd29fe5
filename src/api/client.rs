//! API client for the account service.
//!
//! Every authenticated call follows the same discipline: build the request,
//! let the session attach the bearer token, dispatch, then unconditionally
//! settle the outcome against the session (rotation, invalidation, or
//! nothing) before the caller sees data or an error. Token mutation never
//! happens anywhere else.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::auth::{SessionEvent, SessionStore, REFRESH_HEADER};
use crate::models::{Account, LoginRequest, ProfileUpdate, SignupRequest};

use super::ApiError;

/// HTTP request timeout in seconds.
/// The account service answers quickly; anything slower reads as an outage.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// API client for the account service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the session handle shares its cell.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: String, session: SessionStore) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Authenticate and establish a session from the token header.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let url = format!("{}/account/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let token = response
            .headers()
            .get(REFRESH_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                warn!("Login succeeded but the token header is missing");
                ApiError::InvalidResponse("login response carried no token".to_string())
            })?;

        self.session.establish(token, email);
        debug!("Session established");
        Ok(())
    }

    /// Create an account. On success the caller signs in separately; signup
    /// itself issues no token.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), ApiError> {
        let url = format!("{}/account/signup", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SignupRequest {
                email,
                password,
                confirm_password,
            })
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Fetch the authenticated account's profile.
    pub async fn fetch_profile(&self) -> Result<Account, ApiError> {
        let url = format!("{}/account/profile", self.base_url);
        let outcome = self
            .session
            .attach(self.client.get(&url))
            .send()
            .await;

        let event = self.session.settle(&outcome);
        let response = outcome?;
        if event == SessionEvent::Unauthenticated {
            return Err(ApiError::Unauthorized);
        }

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("profile body: {}", e)))
    }

    /// Update the editable profile fields. A rotated token in the response
    /// is stored before this returns.
    pub async fn edit_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        let url = format!("{}/account/edit", self.base_url);
        let outcome = self
            .session
            .attach(self.client.put(&url).json(update))
            .send()
            .await;

        let event = self.session.settle(&outcome);
        let response = outcome?;
        if event == SessionEvent::Unauthenticated {
            return Err(ApiError::Unauthorized);
        }

        Self::check_response(response).await?;
        Ok(())
    }

    /// Check if a response is successful, returning an error with the body
    /// if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}
