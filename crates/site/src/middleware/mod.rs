//! HTTP middleware stack for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (recorded in the span and the Sentry scope)
//! 4. Security headers (CSP, frame denial)
//! 5. Session layer (tower-sessions, in-memory store)
//! 6. Rate limiting (governor) on lead intake, sign-in and the beacon
//!
//! Extractors resolve per-request context after the layers have run:
//! [`Visitor`] for analytics attribution and [`RequireCustomer`] for the
//! account area.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod visitor;

pub use auth::{RequireCustomer, clear_auth_session, set_auth_session};
pub use rate_limit::{auth_rate_limiter, beacon_rate_limiter, client_ip, lead_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use visitor::Visitor;
