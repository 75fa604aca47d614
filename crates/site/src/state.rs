//! Application state shared across handlers.

use std::sync::Arc;

use lummi_supabase::{SupabaseClient, SupabaseError};

use crate::config::SiteConfig;
use crate::services::Analytics;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    supabase: Option<SupabaseClient>,
    analytics: Analytics,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: SiteConfig) -> Result<Self, SupabaseError> {
        let supabase = config
            .supabase
            .as_ref()
            .map(SupabaseClient::new)
            .transpose()?;
        let analytics = Analytics::new(supabase.clone(), config.ip_hash_salt.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                analytics,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// The backend client, or `None` when the backend is not configured.
    #[must_use]
    pub fn supabase(&self) -> Option<&SupabaseClient> {
        self.inner.supabase.as_ref()
    }

    /// Get a reference to the analytics emitter.
    #[must_use]
    pub fn analytics(&self) -> &Analytics {
        &self.inner.analytics
    }
}
