//! Customer profiles.

use lummi_core::{Profile, ProfileUpdate, UserId};

use crate::client::SupabaseClient;
use crate::error::SupabaseError;
use crate::rest::Query;
use crate::tables;

impl SupabaseClient {
    /// The signed-in user's profile row, if one exists.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn get_profile(
        &self,
        user_id: UserId,
        token: &str,
    ) -> Result<Option<Profile>, SupabaseError> {
        let query = Query::table(tables::PROFILES)
            .select("id,email,display_name,city")
            .eq("id", user_id);
        let rows: Vec<Profile> = self.select(&query, Some(token)).await?;
        Ok(rows.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns error if the update is rejected.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
        token: &str,
    ) -> Result<(), SupabaseError> {
        let query = Query::table(tables::PROFILES).eq("id", user_id);
        self.update(&query, update, Some(token)).await
    }
}
