//! `site_settings` key/value rows.

use lummi_core::{SettingKey, SettingRow};
use serde_json::Value;

use crate::client::SupabaseClient;
use crate::error::SupabaseError;
use crate::rest::Query;
use crate::tables;

impl SupabaseClient {
    /// Fetch the given keys in one query. Missing keys are simply absent.
    ///
    /// `token` is `None` for the public site (anon read) and the admin's token
    /// for the settings screen.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn site_settings(
        &self,
        keys: &[SettingKey],
        token: Option<&str>,
    ) -> Result<Vec<SettingRow>, SupabaseError> {
        let names: Vec<&str> = keys.iter().map(|key| key.as_str()).collect();
        let query = Query::table(tables::SITE_SETTINGS)
            .select("key,value")
            .in_list("key", &names);
        self.select(&query, token).await
    }

    /// Upsert rows keyed by `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the upsert is rejected.
    pub async fn upsert_settings(
        &self,
        rows: &[SettingRow],
        token: Option<&str>,
    ) -> Result<(), SupabaseError> {
        self.upsert(tables::SITE_SETTINGS, rows, Some("key"), token)
            .await
    }

    /// Replace one setting's stored value.
    ///
    /// # Errors
    ///
    /// Returns error if the upsert is rejected.
    pub async fn set_setting(
        &self,
        key: &str,
        value: Value,
        token: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let row = SettingRow {
            key: key.to_string(),
            value,
        };
        self.upsert_settings(std::slice::from_ref(&row), token).await
    }
}
