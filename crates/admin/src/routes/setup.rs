//! Setup instructions and the access-denied page.
//!
//! Both are terminal states of the admin gate rather than failures: the
//! operator has not configured the backend yet, or the signed-in user is not
//! an admin.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lummi_core::DenialReason;

use crate::filters;
use crate::routes::render;

/// Variables the operator has to provide.
pub const REQUIRED_VARIABLES: [&str; 2] = ["SUPABASE_URL", "SUPABASE_ANON_KEY"];

/// Heading of the denied page.
pub const DENIED_TITLE: &str = "Acesso negado";

#[derive(Template)]
#[template(path = "setup.html")]
pub struct SetupTemplate {
    pub variables: &'static [&'static str],
}

impl SetupTemplate {
    /// The setup page as a `503`.
    #[must_use]
    pub fn page() -> Response {
        let template = Self {
            variables: &REQUIRED_VARIABLES,
        };
        (StatusCode::SERVICE_UNAVAILABLE, render(&template)).into_response()
    }
}

#[derive(Template)]
#[template(path = "denied.html")]
pub struct DeniedTemplate {
    pub title: &'static str,
    pub message: &'static str,
}

impl DeniedTemplate {
    /// The denied page as a `403`.
    #[must_use]
    pub fn page(reason: DenialReason) -> Response {
        let template = Self {
            title: DENIED_TITLE,
            message: reason.message(),
        };
        (StatusCode::FORBIDDEN, render(&template)).into_response()
    }
}
