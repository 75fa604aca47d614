//! Setup instructions shown when the backend is not configured.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::filters;

/// Variables the operator has to provide.
pub const REQUIRED_VARIABLES: [&str; 2] = ["SUPABASE_URL", "SUPABASE_ANON_KEY"];

#[derive(Template, WebTemplate)]
#[template(path = "setup.html")]
pub struct SetupTemplate {
    pub variables: &'static [&'static str],
}

impl SetupTemplate {
    /// The setup page as a `503`.
    #[must_use]
    pub fn page() -> Response {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Self {
                variables: &REQUIRED_VARIABLES,
            },
        )
            .into_response()
    }
}
