//! SQL procedures exposed through PostgREST.

use lummi_core::{DashboardReport, DashboardWindow};
use serde_json::json;

use crate::client::SupabaseClient;
use crate::error::SupabaseError;

impl SupabaseClient {
    /// `is_admin()`: evaluated by the backend for the token's user.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails; callers treat that as a denial.
    pub async fn is_admin(&self, token: &str) -> Result<bool, SupabaseError> {
        self.rpc("is_admin", &json!({}), Some(token)).await
    }

    /// `get_admin_dashboard(p_days)`: precomputed aggregates.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails; the procedure raises `not_admin`
    /// for callers without the privilege.
    pub async fn admin_dashboard(
        &self,
        window: DashboardWindow,
        token: Option<&str>,
    ) -> Result<DashboardReport, SupabaseError> {
        self.rpc(
            "get_admin_dashboard",
            &json!({ "p_days": window.days() }),
            token,
        )
        .await
    }
}
