//! Leads route handlers.
//!
//! Leads load newest first in pages of [`PAGE_SIZE`]. "Carregar mais" asks
//! for one more page and the whole prefix is fetched again, so the list is
//! always a consistent snapshot. Status filter and search only narrow what
//! is already loaded.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use lummi_core::{Lead, LeadFilter, LeadId, LeadStatus, whatsapp};
use lummi_supabase::{SupabaseClient, SupabaseError};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Flash, FlashError, FlashNotice, with_error, with_notice};
use crate::routes::{Layout, render};
use crate::state::AppState;

/// Rows per backend request.
pub const PAGE_SIZE: usize = 200;

/// Upper bound on `?pages=` so one request cannot pull the whole table.
const MAX_PAGES: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct LeadsQuery {
    pub pages: Option<usize>,
    pub status: Option<String>,
    pub q: Option<String>,
    pub toast: Option<String>,
    pub error: Option<String>,
}

impl LeadsQuery {
    fn page_count(&self) -> usize {
        self.pages.unwrap_or(1).clamp(1, MAX_PAGES)
    }

    fn flash(&self) -> Flash {
        Flash::from_codes(self.toast.as_deref(), self.error.as_deref())
    }

    fn filter(&self) -> LeadFilter {
        LeadFilter {
            status: self.status.as_deref().and_then(|s| s.parse().ok()),
            search: self.q.clone().unwrap_or_default(),
        }
    }
}

/// Status select option for one lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn status_options(current: Option<LeadStatus>) -> Vec<StatusOption> {
    LeadStatus::ALL
        .into_iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            label: status.label(),
            selected: Some(status) == current,
        })
        .collect()
}

/// A lead row as shown in the table.
#[derive(Debug, Clone)]
pub struct LeadView {
    pub id: String,
    pub created_at: String,
    pub name: String,
    pub whatsapp: String,
    pub car_model: String,
    pub city: String,
    pub source: String,
    pub status_label: &'static str,
    pub status_options: Vec<StatusOption>,
    pub is_new: bool,
    pub followup_url: String,
}

impl From<&Lead> for LeadView {
    fn from(lead: &Lead) -> Self {
        let status = lead.current_status();
        Self {
            id: lead.id.to_string(),
            created_at: lead
                .created_at
                .map(|at| at.format("%d/%m/%Y %H:%M").to_string())
                .unwrap_or_default(),
            name: lead.name.clone(),
            whatsapp: lead.whatsapp.clone(),
            car_model: lead.car_model.clone().unwrap_or_default(),
            city: lead.city.clone().unwrap_or_default(),
            source: lead.source.clone().unwrap_or_default(),
            status_label: status.label(),
            status_options: status_options(Some(status)),
            is_new: status == LeadStatus::New,
            followup_url: whatsapp::link(&lead.whatsapp, &whatsapp::lead_followup_message(lead)),
        }
    }
}

/// Leads template.
#[derive(Template)]
#[template(path = "leads.html")]
pub struct LeadsTemplate {
    pub layout: Layout,
    pub leads: Vec<LeadView>,
    pub loaded: usize,
    pub pages: usize,
    pub has_more: bool,
    pub search: String,
    pub filter_options: Vec<StatusOption>,
    /// Active status filter, echoed into the row forms.
    pub filter_status: &'static str,
    pub more_url: String,
    pub error: Option<String>,
}

/// Status change form. `pages`, `filter` and `q` carry the list view to
/// return to.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub pages: Option<usize>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

/// "Marcar contactado" form; only the list view to return to.
#[derive(Debug, Default, Deserialize)]
pub struct ContactedForm {
    #[serde(default)]
    pub pages: Option<usize>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

/// Build the leads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/leads", get(leads_page))
        .route("/admin/leads/{id}/status", post(update_status))
        .route("/admin/leads/{id}/contacted", post(mark_contacted))
}

/// Fetch pages `0..pages`, stopping at the first short page.
///
/// Returns the rows and whether another page may exist.
async fn load_pages(
    client: &SupabaseClient,
    pages: usize,
    token: &str,
) -> Result<(Vec<Lead>, bool), SupabaseError> {
    let mut rows = Vec::with_capacity(pages.saturating_mul(PAGE_SIZE));
    for page in 0..pages {
        let batch = client.list_leads(page, PAGE_SIZE, token).await?;
        let full = batch.len() == PAGE_SIZE;
        rows.extend(batch);
        if !full {
            return Ok((rows, false));
        }
    }
    Ok((rows, true))
}

/// Render the leads page.
///
/// GET /admin/leads
#[instrument(skip(state, auth, query))]
async fn leads_page(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Query(query): Query<LeadsQuery>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    let pages = query.page_count();
    let filter = query.filter();
    let layout = Layout::new(&auth, "/admin/leads", &state, query.flash());

    let (rows, has_more, error) = match load_pages(client, pages, &auth.access_token).await {
        Ok((rows, has_more)) => (rows, has_more, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load leads");
            (Vec::new(), false, Some(e.user_message()))
        }
    };

    let leads: Vec<LeadView> = rows
        .iter()
        .filter(|lead| filter.matches(lead))
        .map(LeadView::from)
        .collect();

    render(&LeadsTemplate {
        layout,
        loaded: rows.len(),
        leads,
        pages,
        has_more,
        more_url: leads_path(Some(pages + 1), filter.status, &filter.search),
        filter_status: filter.status.map_or("", LeadStatus::as_str),
        filter_options: status_options(filter.status),
        search: filter.search,
        error,
    })
    .into_response()
}

/// The leads list with its loaded pages, status filter and search.
fn leads_path(pages: Option<usize>, status: Option<LeadStatus>, search: &str) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(pages) = pages.filter(|&pages| pages > 1) {
        query.append_pair("pages", &pages.min(MAX_PAGES).to_string());
    }
    if let Some(status) = status {
        query.append_pair("status", status.as_str());
    }
    let search = search.trim();
    if !search.is_empty() {
        query.append_pair("q", search);
    }
    let query = query.finish();
    if query.is_empty() {
        "/admin/leads".to_string()
    } else {
        format!("/admin/leads?{query}")
    }
}

fn return_path(pages: Option<usize>, filter: Option<&str>, search: Option<&str>) -> String {
    leads_path(
        pages,
        filter.and_then(|s| s.parse().ok()),
        search.unwrap_or_default(),
    )
}

async fn set_status(
    state: &AppState,
    auth: &lummi_supabase::AuthSession,
    id: LeadId,
    status: LeadStatus,
    back: &str,
) -> Redirect {
    let Some(client) = state.supabase() else {
        return Redirect::to(&with_error(back, FlashError::SaveFailed));
    };

    match client
        .update_lead_status(id, status, &auth.access_token)
        .await
    {
        Ok(()) => {
            tracing::info!(lead_id = %id, %status, "Lead status updated");
            Redirect::to(&with_notice(back, FlashNotice::StatusUpdated))
        }
        Err(e) => {
            tracing::warn!(error = %e, lead_id = %id, "Failed to update lead status");
            Redirect::to(&with_error(back, FlashError::SaveFailed))
        }
    }
}

/// Set a lead's status. Any status may follow any other.
///
/// POST /admin/leads/{id}/status
#[instrument(skip(state, auth, form))]
async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<LeadId>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let back = return_path(form.pages, form.filter.as_deref(), form.q.as_deref());
    let Ok(status) = form.status.parse::<LeadStatus>() else {
        return Redirect::to(&with_error(&back, FlashError::InvalidStatus));
    };
    set_status(&state, &auth, id, status, &back).await
}

/// Shortcut for the most common transition.
///
/// POST /admin/leads/{id}/contacted
#[instrument(skip(state, auth, form))]
async fn mark_contacted(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<LeadId>,
    Form(form): Form<ContactedForm>,
) -> Redirect {
    let back = return_path(form.pages, form.filter.as_deref(), form.q.as_deref());
    set_status(&state, &auth, id, LeadStatus::Contacted, &back).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lead() -> Lead {
        serde_json::from_value(serde_json::json!({
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "created_at": "2026-03-02T14:05:00Z",
            "name": "João",
            "whatsapp": "11999998888",
            "car_model": "Civic Si",
            "city": "São Paulo",
            "status": "contacted"
        }))
        .unwrap()
    }

    #[test]
    fn test_lead_view() {
        let view = LeadView::from(&lead());
        assert_eq!(view.created_at, "02/03/2026 14:05");
        assert_eq!(view.status_label, "Contactado");
        assert!(!view.is_new);
        assert!(view.followup_url.starts_with("https://wa.me/11999998888?text="));
        assert!(view.followup_url.contains("Civic%20Si"));
        let selected: Vec<&str> = view
            .status_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, vec!["contacted"]);
    }

    #[test]
    fn test_query_defaults_and_bounds() {
        let query = LeadsQuery::default();
        assert_eq!(query.page_count(), 1);
        let query = LeadsQuery {
            pages: Some(10_000),
            ..LeadsQuery::default()
        };
        assert_eq!(query.page_count(), MAX_PAGES);
    }

    #[test]
    fn test_query_filter() {
        let query = LeadsQuery {
            status: Some("won".to_string()),
            q: Some("joão".to_string()),
            ..LeadsQuery::default()
        };
        let filter = query.filter();
        assert_eq!(filter.status, Some(LeadStatus::Won));
        assert!(!filter.matches(&lead()));

        let query = LeadsQuery {
            status: Some(String::new()),
            q: Some("9988".to_string()),
            ..LeadsQuery::default()
        };
        assert!(query.filter().matches(&lead()));
    }

    #[test]
    fn test_leads_path_keeps_loaded_pages() {
        assert_eq!(leads_path(None, None, ""), "/admin/leads");
        assert_eq!(leads_path(Some(1), None, "  "), "/admin/leads");
        assert_eq!(leads_path(Some(3), None, ""), "/admin/leads?pages=3");
        assert_eq!(
            leads_path(Some(10_000), None, ""),
            format!("/admin/leads?pages={MAX_PAGES}")
        );
    }

    #[test]
    fn test_leads_path_keeps_filter_and_search() {
        assert_eq!(
            leads_path(Some(2), Some(LeadStatus::New), " São Paulo "),
            "/admin/leads?pages=2&status=new&q=S%C3%A3o+Paulo"
        );
        assert_eq!(
            return_path(None, Some("won"), Some("civic&si")),
            "/admin/leads?status=won&q=civic%26si"
        );
        assert_eq!(return_path(None, Some(""), Some("")), "/admin/leads");
        assert_eq!(return_path(None, Some("archived"), None), "/admin/leads");
    }
}
