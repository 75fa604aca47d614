//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /              - Landing page (?categoria= preselects the gallery filter)
//! POST /diagnostico   - Lead intake ("x-fragment: 1" returns the step fragment)
//! POST /api/events    - Analytics beacon (always 204)
//! GET  /health        - Health check
//!
//! # Customer auth
//! GET  /login         - Sign-in form
//! POST /login         - Sign in (password grant)
//! GET  /signup        - Sign-up form
//! POST /signup        - Create account
//! POST /logout        - Sign out
//!
//! # Account (customer gate)
//! GET  /account       - Profile
//! POST /account       - Update display name and city
//! ```

pub mod account;
pub mod auth;
pub mod diagnostic;
pub mod events;
pub mod home;
pub mod setup;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, beacon_rate_limiter, lead_rate_limiter};
use crate::state::AppState;

/// Create the customer auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).post(auth::login).layer(auth_rate_limiter()),
        )
        .route(
            "/signup",
            get(auth::signup_page).post(auth::signup).layer(auth_rate_limiter()),
        )
        .route("/logout", post(auth::logout))
        .route("/account", get(account::show).post(account::update))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route(
            "/diagnostico",
            post(diagnostic::submit).layer(lead_rate_limiter()),
        )
        .route(
            "/api/events",
            post(events::beacon).layer(beacon_rate_limiter()),
        )
        .route("/health", get(health))
        .merge(auth_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
