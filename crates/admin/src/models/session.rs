//! Session-related types for admin authentication.
//!
//! Only the backend session is stored. Whether its user is an admin is asked
//! again on every request, so revoking the privilege takes effect at once.

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for the signed-in admin's backend session.
    pub const ADMIN_SESSION: &str = "admin_session";
}
