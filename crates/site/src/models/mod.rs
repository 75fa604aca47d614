//! Types kept in the visitor's server-side session.

pub mod session;

pub use session::keys as session_keys;
