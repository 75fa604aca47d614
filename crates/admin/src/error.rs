//! Unified error handling for admin.
//!
//! Screens render backend failures inline where they can; this type covers
//! the rest (session store, unknown ids, setup and denial pages).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lummi_core::DenialReason;
use lummi_supabase::SupabaseError;
use thiserror::Error;

use crate::routes::setup::{DeniedTemplate, SetupTemplate};

/// Application-level error type for the admin panel.
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

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Signed in but not an admin.
    #[error("Forbidden: {}", .0.message())]
    Forbidden(DenialReason),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Backend(_) | Self::Session(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        match self {
            Self::Unconfigured => SetupTemplate::page(),
            Self::Forbidden(reason) => DeniedTemplate::page(reason),
            Self::Backend(_) => (StatusCode::BAD_GATEWAY, "External service error").into_response(),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            // Don't expose internal error details to clients
            Self::Session(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the signed-in admin.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
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
    fn test_app_error_display() {
        let err = AppError::NotFound("portfolio item".to_string());
        assert_eq!(err.to_string(), "Not found: portfolio item");

        let err = AppError::Forbidden(DenialReason::CheckFailed);
        assert_eq!(err.to_string(), "Forbidden: Falha ao validar permissões.");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::Unconfigured), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            get_status(AppError::Forbidden(DenialReason::NotAdmin)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Backend(SupabaseError::NotConfigured)),
            StatusCode::BAD_GATEWAY
        );
    }
}
