//! Application state shared across handlers.

use std::sync::Arc;

use lummi_supabase::{SupabaseClient, SupabaseError};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    supabase: Option<SupabaseClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, SupabaseError> {
        let supabase = config
            .supabase
            .as_ref()
            .map(SupabaseClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, supabase }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// The backend client, or `None` when the backend is not configured.
    #[must_use]
    pub fn supabase(&self) -> Option<&SupabaseClient> {
        self.inner.supabase.as_ref()
    }
}
