//! GoTrue authentication: password sign-in, sign-up, refresh and logout.

use chrono::Utc;
use lummi_core::UserId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::client::SupabaseClient;
use crate::error::SupabaseError;

/// Seconds before expiry at which a token is treated as expired.
const EXPIRY_BUFFER_SECS: i64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// Session Types
// ─────────────────────────────────────────────────────────────────────────────

/// Authenticated user as returned by GoTrue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    /// `display_name` from user metadata, if set at sign-up.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.user_metadata
            .get("display_name")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// A signed-in session, stored server-side in the visitor's session.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp at which `access_token` expires.
    pub expires_at: i64,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

impl AuthSession {
    /// Check if the access token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at - EXPIRY_BUFFER_SECS
    }
}

/// Result of a sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled; the user is signed in.
    SignedIn(AuthSession),
    /// The user must confirm their email before signing in.
    ConfirmationRequired,
}

/// Raw token response from the GoTrue token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let now = Utc::now().timestamp();
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now + secs))
            .unwrap_or(now + 3600);
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Operations
// ─────────────────────────────────────────────────────────────────────────────

impl SupabaseClient {
    /// Email + password sign-in.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` with GoTrue's message on bad credentials.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        self.token_grant("password", &json!({ "email": email, "password": password }))
            .await
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns error if the refresh token was revoked or already used.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        self.token_grant("refresh_token", &json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn token_grant(&self, grant_type: &str, body: &Value) -> Result<AuthSession, SupabaseError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        let request = self.request(Method::POST, url, None).json(body);
        let response: TokenResponse = self.send_json(request).await?;
        Ok(response.into_session())
    }

    /// Create an account. `display_name` is stored in user metadata.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the email is taken or the password is
    /// rejected.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, SupabaseError> {
        let url = self.endpoint("auth/v1/signup")?;
        let data = display_name.map_or_else(|| json!({}), |name| json!({ "display_name": name }));
        let request = self.request(Method::POST, url, None).json(&json!({
            "email": email,
            "password": password,
            "data": data,
        }));

        let body: Value = self.send_json(request).await?;
        if body.get("access_token").is_some() {
            let response: TokenResponse = serde_json::from_value(body)?;
            Ok(SignUpOutcome::SignedIn(response.into_session()))
        } else {
            Ok(SignUpOutcome::ConfirmationRequired)
        }
    }

    /// Revoke the session's refresh tokens.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.endpoint("auth/v1/logout")?;
        let request = self.request(Method::POST, url, Some(access_token));
        self.send(request).await.map(drop)
    }
}
