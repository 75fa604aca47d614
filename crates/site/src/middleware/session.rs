//! Session middleware configuration.
//!
//! Visitor sessions live in process memory. They carry the anonymous
//! analytics id and, after sign-in, the customer's backend session; losing
//! them on restart only costs a new visitor id and a fresh sign-in.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lummi_session";

/// Inactivity expiry (180 days), so the visitor id survives between visits.
const SESSION_EXPIRY_DAYS: i64 = 180;

/// Create the session layer backed by an in-memory store.
#[must_use]
pub fn create_session_layer(config: &SiteConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
