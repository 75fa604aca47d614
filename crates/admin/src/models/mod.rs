//! Types kept in the admin's server-side session and carried across
//! redirects.

pub mod flash;
pub mod session;

pub use flash::{Flash, FlashError, FlashNotice, FlashQuery, with_error, with_notice};
pub use session::keys as session_keys;
