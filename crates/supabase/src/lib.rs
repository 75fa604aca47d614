//! Supabase client for Lummi.
//!
//! # Architecture
//!
//! - Supabase is the source of truth - no local copies, direct API calls
//! - PostgREST for table access (`/rest/v1/<table>`) and SQL procedures
//!   (`/rest/v1/rpc/<name>`)
//! - GoTrue for authentication (`/auth/v1/...`)
//! - Row-level security is enforced by the backend; calls made on behalf of a
//!   signed-in user carry that user's access token
//!
//! # Example
//!
//! ```rust,ignore
//! use lummi_supabase::{SupabaseClient, SupabaseConfig};
//!
//! let config = SupabaseConfig::from_env()?.expect("backend configured");
//! let client = SupabaseClient::new(&config)?;
//!
//! let session = client.sign_in_with_password("ana@example.com", "hunter22").await?;
//! let is_admin = client.is_admin(&session.access_token).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod auth;
mod client;
mod config;
mod content;
mod error;
mod leads;
mod procedures;
mod profiles;
mod rest;
mod settings;

pub use auth::{AuthSession, AuthUser, SignUpOutcome};
pub use client::SupabaseClient;
pub use config::{ConfigError, SupabaseConfig};
pub use error::SupabaseError;
pub use rest::Query;

/// Table names used by the application.
pub mod tables {
    pub const LEADS: &str = "leads";
    pub const EVENTS: &str = "events";
    pub const PORTFOLIO_ITEMS: &str = "portfolio_items";
    pub const TESTIMONIALS: &str = "testimonials";
    pub const SITE_SETTINGS: &str = "site_settings";
    pub const PROFILES: &str = "profiles";
}
