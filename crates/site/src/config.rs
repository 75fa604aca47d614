//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LUMMI_SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `LUMMI_SITE_PORT` - Listen port (default: 3000)
//! - `LUMMI_SITE_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `LUMMI_WHATSAPP_NUMBER` - Fallback `WhatsApp` number when the stored
//!   setting is absent (default: 5511999999999)
//! - `LUMMI_ADMIN_URL` - Target of the "Admin →" link on the account page
//!   (default: <http://localhost:3001/admin>)
//! - `LUMMI_IP_HASH_SALT` - Enables `ip_hash` on analytics events
//! - `LUMMI_RENDER_BUDGET_MS` - Longest the landing page waits on the
//!   backend before rendering defaults (default: 1500)
//! - `SUPABASE_URL` / `SUPABASE_ANON_KEY` - Backend; both absent means the
//!   site runs unconfigured and shows setup instructions where needed
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use lummi_supabase::{ConfigError, SupabaseConfig};
use secrecy::SecretString;

const DEFAULT_WHATSAPP_NUMBER: &str = "5511999999999";
const DEFAULT_RENDER_BUDGET_MS: u64 = 1500;

/// Public site configuration.
///
/// Implements `Debug` manually to redact the salt.
#[derive(Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// `WhatsApp` number used until a stored setting overrides it
    pub whatsapp_fallback: String,
    /// Admin panel URL, linked from the account page
    pub admin_url: String,
    /// Salt for hashing client IPs on analytics events
    pub ip_hash_salt: Option<SecretString>,
    /// Longest the landing page waits on remote content
    pub render_budget: Duration,
    /// Backend connection; `None` when unconfigured
    pub supabase: Option<SupabaseConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("whatsapp_fallback", &self.whatsapp_fallback)
            .field("admin_url", &self.admin_url)
            .field(
                "ip_hash_salt",
                &self.ip_hash_salt.as_ref().map(|_| "[REDACTED]"),
            )
            .field("render_budget", &self.render_budget)
            .field("supabase", &self.supabase)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish_non_exhaustive()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// backend is half-configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("LUMMI_SITE_HOST", "127.0.0.1")?;
        let port = parse_env("LUMMI_SITE_PORT", "3000")?;
        let render_budget_ms: u64 = parse_env(
            "LUMMI_RENDER_BUDGET_MS",
            &DEFAULT_RENDER_BUDGET_MS.to_string(),
        )?;

        Ok(Self {
            host,
            port,
            base_url: get_env_or_default("LUMMI_SITE_BASE_URL", "http://localhost:3000"),
            whatsapp_fallback: get_env_or_default("LUMMI_WHATSAPP_NUMBER", DEFAULT_WHATSAPP_NUMBER),
            admin_url: get_env_or_default("LUMMI_ADMIN_URL", "http://localhost:3001/admin"),
            ip_hash_salt: get_optional_env("LUMMI_IP_HASH_SALT").map(SecretString::from),
            render_budget: Duration::from_millis(render_budget_ms),
            supabase: SupabaseConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Configuration for tests and local tooling: loopback, no backend.
    #[must_use]
    pub fn local(supabase: Option<SupabaseConfig>) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            whatsapp_fallback: DEFAULT_WHATSAPP_NUMBER.to_string(),
            admin_url: "http://localhost:3001/admin".to_string(),
            ip_hash_salt: None,
            render_budget: Duration::from_millis(DEFAULT_RENDER_BUDGET_MS),
            supabase,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable; blank counts as absent.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
