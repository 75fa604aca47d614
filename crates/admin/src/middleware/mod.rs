//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (recorded in the span and the Sentry scope)
//! 4. Security headers (stricter CSP, `no-store`)
//! 5. Session layer (tower-sessions, in-memory store)
//! 6. Rate limiting on `POST /admin/login`
//!
//! The admin gate itself is the [`RequireAdmin`] extractor, taken by every
//! handler except login.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdmin, clear_admin_session, set_admin_session};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
