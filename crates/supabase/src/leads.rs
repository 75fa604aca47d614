//! Leads and analytics events.

use lummi_core::{Lead, LeadId, LeadStatus, NewEvent, NewLead};
use serde_json::json;
use tracing::instrument;

use crate::client::SupabaseClient;
use crate::error::SupabaseError;
use crate::rest::Query;
use crate::tables;

impl SupabaseClient {
    /// Insert a lead from the public form (anonymous insert, RLS-guarded).
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the insert.
    #[instrument(skip(self, lead), fields(source = %lead.source))]
    pub async fn insert_lead(&self, lead: &NewLead) -> Result<(), SupabaseError> {
        self.insert(tables::LEADS, lead, None).await
    }

    /// Append an analytics event.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the insert. Callers on the public
    /// site discard it.
    pub async fn insert_event(&self, event: &NewEvent) -> Result<(), SupabaseError> {
        self.insert(tables::EVENTS, event, None).await
    }

    /// One page of leads, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the caller lacks access.
    pub async fn list_leads(
        &self,
        page: usize,
        page_size: usize,
        token: &str,
    ) -> Result<Vec<Lead>, SupabaseError> {
        let from = page.saturating_mul(page_size);
        let to = from.saturating_add(page_size.saturating_sub(1));
        let query = Query::table(tables::LEADS)
            .select("*")
            .order("created_at", false)
            .range(from, to);
        self.select(&query, Some(token)).await
    }

    /// Set a lead's status. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the caller lacks access.
    #[instrument(skip(self, token), fields(lead_id = %id, status = %status))]
    pub async fn update_lead_status(
        &self,
        id: LeadId,
        status: LeadStatus,
        token: &str,
    ) -> Result<(), SupabaseError> {
        let query = Query::table(tables::LEADS).eq("id", id);
        self.update(&query, &json!({ "status": status }), Some(token))
            .await
    }
}
