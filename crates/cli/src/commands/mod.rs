//! Command implementations.

pub mod dashboard;
pub mod migrate;
pub mod settings;

use lummi_supabase::{ConfigError, SupabaseClient, SupabaseConfig, SupabaseError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Supabase error: {0}")]
    Backend(#[from] SupabaseError),

    #[error("Unknown setting: {0}. Valid keys: whatsapp_number, capacity_monthly, capacity_remaining, next_window")]
    UnknownSetting(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: &'static str },
}

/// Client authenticated with the service-role key.
///
/// # Errors
///
/// Returns `CliError::Config` if the URL or key is missing or weak.
pub fn service_client() -> Result<SupabaseClient, CliError> {
    dotenvy::dotenv().ok();
    let config = SupabaseConfig::service_role_from_env()?;
    Ok(SupabaseClient::new(&config)?)
}
