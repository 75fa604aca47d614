//! Dashboard route handler.
//!
//! Everything shown is computed by the `get_admin_dashboard` procedure; this
//! module only picks the window and formats numbers for pt-BR.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use lummi_core::types::dashboard::{format_count, format_rate};
use lummi_core::{BreakdownRow, DashboardReport, DashboardWindow, DenialReason};
use lummi_supabase::SupabaseError;
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::routes::setup::DeniedTemplate;
use crate::routes::{Layout, render};
use crate::state::AppState;

/// Marker raised by the procedure for callers without the privilege.
const NOT_ADMIN_MARKER: &str = "not_admin";

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Kept as text so junk falls back to the default window instead of a 400.
    pub days: Option<String>,
    pub toast: Option<String>,
    pub error: Option<String>,
}

/// Formatted summary figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub page_views: String,
    pub leads_submitted: String,
    pub whatsapp_clicks: String,
    pub lead_rate: String,
    pub whatsapp_rate: String,
}

/// One formatted breakdown row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownView {
    pub label: String,
    pub count: String,
}

impl BreakdownView {
    fn rows(rows: &[BreakdownRow]) -> Vec<Self> {
        rows.iter()
            .map(|row| Self {
                label: row.display_label().to_string(),
                count: format_count(row.count),
            })
            .collect()
    }
}

/// The report, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub summary: SummaryView,
    pub whatsapp_by_source: Vec<BreakdownView>,
    pub events_by_source: Vec<BreakdownView>,
    pub leads_by_status: Vec<BreakdownView>,
}

impl From<&DashboardReport> for ReportView {
    fn from(report: &DashboardReport) -> Self {
        let summary = &report.summary;
        Self {
            summary: SummaryView {
                page_views: format_count(summary.page_views),
                leads_submitted: format_count(summary.leads_submitted),
                whatsapp_clicks: format_count(summary.whatsapp_clicks),
                lead_rate: format_rate(summary.lead_rate),
                whatsapp_rate: format_rate(summary.whatsapp_rate),
            },
            whatsapp_by_source: BreakdownView::rows(&report.whatsapp_by_source),
            events_by_source: BreakdownView::rows(report.top_event_sources()),
            leads_by_status: BreakdownView::rows(&report.leads_by_status),
        }
    }
}

/// Window selector tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTab {
    pub days: i64,
    pub label: &'static str,
    pub active: bool,
}

fn window_tabs(current: DashboardWindow) -> Vec<WindowTab> {
    DashboardWindow::ALL
        .into_iter()
        .map(|window| WindowTab {
            days: window.days(),
            label: window.label(),
            active: window == current,
        })
        .collect()
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub windows: Vec<WindowTab>,
    pub report: Option<ReportView>,
    pub error: Option<String>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/dashboard", get(dashboard))
}

fn parse_window(days: Option<&str>) -> DashboardWindow {
    DashboardWindow::from_days(days.and_then(|d| d.trim().parse().ok()))
}

fn is_not_admin(error: &SupabaseError) -> bool {
    error.to_string().contains(NOT_ADMIN_MARKER)
}

/// Render the dashboard.
///
/// GET /admin/dashboard
#[instrument(skip(state, auth, query))]
async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let window = parse_window(query.days.as_deref());
    let layout = Layout::new(
        &auth,
        "/admin/dashboard",
        &state,
        Flash::from_codes(query.toast.as_deref(), query.error.as_deref()),
    );

    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    let (report, error) = match client
        .admin_dashboard(window, Some(&auth.access_token))
        .await
    {
        Ok(report) => (Some(ReportView::from(&report)), None),
        Err(e) if is_not_admin(&e) => {
            tracing::info!(user_id = %auth.user.id, "Dashboard procedure refused caller");
            return DeniedTemplate::page(DenialReason::NotAdmin);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load dashboard");
            (None, Some(e.user_message()))
        }
    };

    render(&DashboardTemplate {
        layout,
        windows: window_tabs(window),
        report,
        error,
    })
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_window_parsing_falls_back_to_week() {
        assert_eq!(parse_window(Some("30")), DashboardWindow::Month);
        assert_eq!(parse_window(Some("14")), DashboardWindow::Week);
        assert_eq!(parse_window(Some("abc")), DashboardWindow::Week);
        assert_eq!(parse_window(None), DashboardWindow::Week);
    }

    #[test]
    fn test_window_tabs_mark_active() {
        let tabs = window_tabs(DashboardWindow::Month);
        assert_eq!(tabs.len(), 2);
        assert!(!tabs[0].active);
        assert!(tabs[1].active);
        assert_eq!(tabs[1].days, 30);
    }

    #[test]
    fn test_report_view_formats_numbers() {
        let report: DashboardReport = serde_json::from_value(serde_json::json!({
            "summary": {
                "page_views": 12345,
                "leads_submitted": 30,
                "whatsapp_clicks": 90,
                "lead_rate": 0.125,
                "whatsapp_rate": 37.5
            },
            "whatsapp_by_source": [{ "source": "hero", "count": 1200 }],
            "events_by_source": [],
            "leads_by_status": [{ "status": null, "count": 3 }]
        }))
        .unwrap();

        let view = ReportView::from(&report);
        assert_eq!(view.summary.page_views, "12.345");
        assert_eq!(view.summary.lead_rate, "12,5%");
        assert_eq!(view.summary.whatsapp_rate, "37,5%");
        assert_eq!(view.whatsapp_by_source[0].label, "hero");
        assert_eq!(view.whatsapp_by_source[0].count, "1.200");
        assert_eq!(view.leads_by_status[0].label, "(não informado)");
    }

    #[test]
    fn test_not_admin_detection() {
        let error = SupabaseError::Api {
            status: 400,
            code: Some("P0001".to_string()),
            message: "not_admin".to_string(),
        };
        assert!(is_not_admin(&error));
        assert!(!is_not_admin(&SupabaseError::RateLimited(5)));
    }
}
