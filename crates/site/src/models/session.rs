//! Session keys.
//!
//! The session holds the anonymous visitor identity (`sess_<hex>`), the most
//! recent UTM set, and, once signed in, the customer's `AuthSession`.

/// Session keys for visitor and authentication data.
pub mod keys {
    /// Anonymous analytics identifier, generated on first visit.
    pub const VISITOR_ID: &str = "visitor_id";

    /// Most recent UTM parameters seen on a landing URL.
    pub const UTM: &str = "utm";

    /// Signed-in customer's backend session.
    pub const AUTH_SESSION: &str = "auth_session";
}
