//! Customer authentication extractor.
//!
//! [`RequireCustomer`] resolves the customer gate before the handler runs:
//! an unconfigured backend renders setup instructions, a missing session
//! redirects to `/login`, anything else yields the signed-in session. There
//! is no role check on the customer side.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use lummi_core::AccessDecision;
use lummi_supabase::AuthSession;
use tower_sessions::Session;

use crate::models::session_keys;
use crate::routes::setup::SetupTemplate;
use crate::state::AppState;

/// Extractor that requires a signed-in customer.
///
/// Expired access tokens are refreshed once. A failed refresh signs the
/// visitor out and redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn account(RequireCustomer(auth): RequireCustomer) -> impl IntoResponse {
///     format!("Olá, {}!", auth.user.email.unwrap_or_default())
/// }
/// ```
pub struct RequireCustomer(pub AuthSession);

/// Why the customer gate turned a request away.
#[derive(Debug)]
pub enum CustomerRejection {
    /// Backend not configured: show setup instructions.
    Unconfigured,
    /// No valid session: go sign in.
    RedirectToLogin,
    /// Session layer missing from the router.
    MissingSession,
}

impl IntoResponse for CustomerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unconfigured => SetupTemplate::page(),
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = CustomerRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(CustomerRejection::MissingSession)?;

        let auth: Option<AuthSession> = session
            .get(session_keys::AUTH_SESSION)
            .await
            .ok()
            .flatten();

        match AccessDecision::for_session(state.supabase().is_some(), auth.is_some()) {
            AccessDecision::Unconfigured => return Err(CustomerRejection::Unconfigured),
            AccessDecision::RedirectToLogin | AccessDecision::Denied(_) => {
                return Err(CustomerRejection::RedirectToLogin);
            }
            AccessDecision::Authorized => {}
        }

        let (Some(auth), Some(client)) = (auth, state.supabase()) else {
            return Err(CustomerRejection::RedirectToLogin);
        };

        if !auth.is_expired() {
            return Ok(Self(auth));
        }

        match client.refresh_session(&auth.refresh_token).await {
            Ok(refreshed) => {
                if let Err(e) = set_auth_session(&session, &refreshed).await {
                    tracing::warn!(error = %e, "Failed to store refreshed session");
                }
                Ok(Self(refreshed))
            }
            Err(e) => {
                tracing::info!(error = %e, "Session refresh failed, signing out");
                if let Err(e) = clear_auth_session(&session).await {
                    tracing::warn!(error = %e, "Failed to clear session");
                }
                Err(CustomerRejection::RedirectToLogin)
            }
        }
    }
}

/// Store the signed-in session.
///
/// The session id is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_session(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH_SESSION, auth).await
}

/// Remove the signed-in session, keeping the anonymous visitor id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<AuthSession>(session_keys::AUTH_SESSION)
        .await?;
    Ok(())
}
