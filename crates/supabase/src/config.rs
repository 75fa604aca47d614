//! Backend connection settings.
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project URL (e.g. `https://abc.supabase.co`)
//! - `SUPABASE_ANON_KEY` - Public anon key used by the site and admin panel
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service-role key, CLI only
//!
//! When neither the URL nor the anon key is set the backend is treated as
//! "not configured" and every dependent feature degrades to a labeled setup
//! state instead of failing.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Values that are obviously copied from a template rather than a real key.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "placeholder",
    "replace-me",
    "insert-",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Supabase project URL plus the key sent as `apikey`.
///
/// Implements `Debug` manually to redact the key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL, always ending in `/`
    pub url: Url,
    /// Key sent on every request (anon key, or service-role key for the CLI)
    pub api_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl SupabaseConfig {
    /// Build a config from a URL string and key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is not
    /// http(s).
    pub fn new(url: &str, api_key: SecretString) -> Result<Self, ConfigError> {
        let mut url = Url::parse(url.trim())
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "SUPABASE_URL".to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self { url, api_key })
    }

    /// Load the public (anon key) configuration.
    ///
    /// Returns `Ok(None)` when the backend is not configured at all.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if only one of the two variables is set, if the
    /// URL is malformed, or if the key is a template placeholder.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let url = get_optional_env("SUPABASE_URL");
        let key = get_optional_env("SUPABASE_ANON_KEY");

        match (url, key) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("SUPABASE_ANON_KEY".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("SUPABASE_URL".to_string())),
            (Some(url), Some(key)) => {
                reject_placeholder(&key, "SUPABASE_ANON_KEY")?;
                Self::new(&url, SecretString::from(key)).map(Some)
            }
        }
    }

    /// Load the service-role configuration used by operator tooling.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either variable is missing or the key fails
    /// placeholder and entropy checks.
    pub fn service_role_from_env() -> Result<Self, ConfigError> {
        let url = get_required_env("SUPABASE_URL")?;
        let key = get_required_env("SUPABASE_SERVICE_ROLE_KEY")?;
        validate_secret_strength(&key, "SUPABASE_SERVICE_ROLE_KEY")?;
        Self::new(&url, SecretString::from(key))
    }

    pub(crate) fn expose_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Unset and blank variables are both treated as absent.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn reject_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // key length never approaches f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    reject_placeholder(secret, var_name)?;

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_appends_trailing_slash() {
        let config = SupabaseConfig::new("https://abc.supabase.co", SecretString::from("k")).unwrap();
        assert_eq!(config.url.as_str(), "https://abc.supabase.co/");

        let config =
            SupabaseConfig::new("http://127.0.0.1:54321/proxy", SecretString::from("k")).unwrap();
        assert_eq!(config.url.as_str(), "http://127.0.0.1:54321/proxy/");
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(SupabaseConfig::new("not a url", SecretString::from("k")).is_err());
        assert!(SupabaseConfig::new("ftp://abc.supabase.co", SecretString::from("k")).is_err());
    }

    #[test]
    fn test_placeholder_keys_are_rejected() {
        assert!(reject_placeholder("your-anon-key", "SUPABASE_ANON_KEY").is_err());
        assert!(reject_placeholder("CHANGEME", "SUPABASE_ANON_KEY").is_err());
        assert!(reject_placeholder("eyJhbGciOiJIUzI1NiJ9.eyJyb2xlIjoiYW5vbiJ9.x1", "K").is_ok());
    }

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("abab") - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_service_key_strength() {
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "K").is_err());
        assert!(
            validate_secret_strength("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.Zm9vYmFyYmF6", "K")
                .is_ok()
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = SupabaseConfig::new(
            "https://abc.supabase.co",
            SecretString::from("super_secret_service_key"),
        )
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("abc.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_key"));
    }
}
