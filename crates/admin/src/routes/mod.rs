//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Auth (email + password, then is_admin)
//! GET  /admin/login                     - Login page
//! POST /admin/login                     - Sign in
//! POST /admin/logout                    - Sign out
//!
//! # Gated (RequireAdmin)
//! GET  /admin                           - Redirect to the dashboard
//! GET  /admin/dashboard?days=7|30       - Aggregates
//! GET  /admin/leads?pages=N&status=&q=  - Leads, newest first
//! POST /admin/leads/{id}/status         - Set status
//! POST /admin/leads/{id}/contacted      - Mark contacted
//! GET  /admin/settings                  - Site settings form
//! POST /admin/settings                  - Validate and upsert
//! GET  /admin/portfolio                 - Items
//! POST /admin/portfolio                 - New draft
//! POST /admin/portfolio/{id}/publish    - Inline publish toggle
//! POST /admin/portfolio/{id}/order      - Inline order index
//! GET  /admin/portfolio/{id}/edit       - Edit dialog
//! POST /admin/portfolio/{id}/edit       - Save the full record
//! GET  /admin/testimonials              - Same shape as portfolio
//! ```

pub mod auth;
pub mod dashboard;
pub mod leads;
pub mod portfolio;
pub mod settings;
pub mod setup;
pub mod testimonials;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
    routing::get,
};
use lummi_supabase::AuthSession;

use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/admin", get(index))
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(leads::router())
        .merge(settings::router())
        .merge(portfolio::router())
        .merge(testimonials::router())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// `/admin` lands on the dashboard (behind the gate).
async fn index(RequireAdmin(_auth): RequireAdmin) -> Redirect {
    Redirect::to("/admin/dashboard")
}

/// Render an Askama template to HTML, logging failures.
pub fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {e}");
        "Internal Server Error".to_string()
    }))
}

/// Navigation entry in the admin layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
}

/// A rendered nav entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

pub const NAV: [NavItem; 5] = [
    NavItem {
        label: "Dashboard",
        href: "/admin/dashboard",
    },
    NavItem {
        label: "Leads",
        href: "/admin/leads",
    },
    NavItem {
        label: "Settings",
        href: "/admin/settings",
    },
    NavItem {
        label: "Portfólio",
        href: "/admin/portfolio",
    },
    NavItem {
        label: "Depoimentos",
        href: "/admin/testimonials",
    },
];

/// Data every gated page shares: who is signed in, where they are, the
/// way back to the site and any pending toast.
#[derive(Debug, Clone)]
pub struct Layout {
    pub admin_email: String,
    pub current_path: &'static str,
    pub site_url: String,
    pub flash: Flash,
}

impl Layout {
    #[must_use]
    pub fn new(auth: &AuthSession, current_path: &'static str, state: &AppState, flash: Flash) -> Self {
        Self {
            admin_email: auth.user.email.clone().unwrap_or_default(),
            current_path,
            site_url: state.config().site_url.clone(),
            flash,
        }
    }

    /// Navigation with the active entry marked.
    #[must_use]
    pub fn nav(&self) -> Vec<NavLink> {
        NAV.iter()
            .map(|item| NavLink {
                label: item.label,
                href: item.href,
                active: item.href == self.current_path,
            })
            .collect()
    }
}
