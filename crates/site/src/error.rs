//! Unified error handling with Sentry integration.
//!
//! Handlers that can fail outright return `Result<T, AppError>`. Most site
//! handlers do not: form flows render backend failures inline, and only
//! session-store failures and missing configuration surface here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lummi_supabase::SupabaseError;
use thiserror::Error;

use crate::routes::setup::SetupTemplate;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] SupabaseError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The backend is not configured for this process.
    #[error("Backend not configured")]
    Unconfigured,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Backend(_) | Self::Session(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::Unconfigured => SetupTemplate::page().into_response(),
            Self::Backend(SupabaseError::RateLimited(_)) => {
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
            }
            Self::Backend(_) => (StatusCode::BAD_GATEWAY, "External service error").into_response(),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            // Don't expose internal error details to clients
            Self::Session(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_renders_setup_page() {
        let response = AppError::Unconfigured.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_error_is_500() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_backend_error_is_bad_gateway() {
        let error = SupabaseError::Api {
            status: 500,
            code: None,
            message: "relation does not exist".to_string(),
        };
        let response = AppError::Backend(error).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_bad_request_passes_message() {
        let response = AppError::BadRequest("missing page id".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
