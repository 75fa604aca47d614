//! Authentication extractor for admin.
//!
//! [`RequireAdmin`] runs the whole admin gate before a handler sees the
//! request. The privilege check goes to the backend on every request and its
//! answer is never stored, so a revoked admin is turned away on their next
//! click.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use lummi_core::{AccessDecision, DenialReason};
use lummi_supabase::{AuthSession, SupabaseClient};
use tower_sessions::Session;

use crate::models::session_keys;
use crate::routes::setup::{DeniedTemplate, SetupTemplate};
use crate::state::AppState;

/// Login page for the admin panel.
pub const LOGIN_PATH: &str = "/admin/login";

/// Extractor that requires a signed-in user for whom `is_admin()` is true.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(auth): RequireAdmin) -> impl IntoResponse {
///     format!("Olá, {}!", auth.user.email.unwrap_or_default())
/// }
/// ```
pub struct RequireAdmin(pub AuthSession);

/// Why the admin gate turned a request away.
#[derive(Debug)]
pub enum AdminRejection {
    /// Backend not configured: show setup instructions.
    Unconfigured,
    /// No valid session: go sign in.
    RedirectToLogin,
    /// Signed in, but the privilege check said no or failed.
    Denied(DenialReason),
    /// Session layer missing from the router.
    MissingSession,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unconfigured => SetupTemplate::page(),
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Denied(reason) => DeniedTemplate::page(reason),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminRejection::MissingSession)?;

        let auth: Option<AuthSession> = session
            .get(session_keys::ADMIN_SESSION)
            .await
            .ok()
            .flatten();

        match AccessDecision::for_session(state.supabase().is_some(), auth.is_some()) {
            AccessDecision::Unconfigured => return Err(AdminRejection::Unconfigured),
            AccessDecision::RedirectToLogin | AccessDecision::Denied(_) => {
                return Err(AdminRejection::RedirectToLogin);
            }
            AccessDecision::Authorized => {}
        }

        let (Some(auth), Some(client)) = (auth, state.supabase()) else {
            return Err(AdminRejection::RedirectToLogin);
        };

        let auth = fresh_session(&session, client, auth).await?;

        let check = client.is_admin(&auth.access_token).await;
        if let Err(e) = &check {
            tracing::warn!(error = %e, user_id = %auth.user.id, "Privilege check failed");
        }

        match AccessDecision::for_privilege_check(&check) {
            AccessDecision::Authorized => Ok(Self(auth)),
            AccessDecision::Denied(reason) => {
                tracing::info!(user_id = %auth.user.id, ?reason, "Admin access denied");
                Err(AdminRejection::Denied(reason))
            }
            AccessDecision::Unconfigured | AccessDecision::RedirectToLogin => {
                Err(AdminRejection::RedirectToLogin)
            }
        }
    }
}

/// Refresh an expired access token once; a failed refresh signs out.
async fn fresh_session(
    session: &Session,
    client: &SupabaseClient,
    auth: AuthSession,
) -> Result<AuthSession, AdminRejection> {
    if !auth.is_expired() {
        return Ok(auth);
    }

    match client.refresh_session(&auth.refresh_token).await {
        Ok(refreshed) => {
            if let Err(e) = session
                .insert(session_keys::ADMIN_SESSION, &refreshed)
                .await
            {
                tracing::warn!(error = %e, "Failed to store refreshed admin session");
            }
            Ok(refreshed)
        }
        Err(e) => {
            tracing::info!(error = %e, "Admin session refresh failed, signing out");
            if let Err(e) = clear_admin_session(session).await {
                tracing::warn!(error = %e, "Failed to clear admin session");
            }
            Err(AdminRejection::RedirectToLogin)
        }
    }
}

/// Store the signed-in admin's session.
///
/// The session id is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_admin_session(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::ADMIN_SESSION, auth).await
}

/// Remove the admin's session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_admin_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<AuthSession>(session_keys::ADMIN_SESSION)
        .await?;
    Ok(())
}
