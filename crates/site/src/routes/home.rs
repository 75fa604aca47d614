//! Landing page route handler.
//!
//! Settings, portfolio and testimonials are fetched concurrently, each under
//! the render budget. Anything that fails, times out or comes back empty is
//! replaced by its fallback so the page always renders.

use std::future::Future;
use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use lummi_core::{
    CategoryFilter, EventName, Gallery, PackageTier, PortfolioCard, PortfolioCategory,
    SettingKey, SiteSettings, TestimonialCard, whatsapp,
};
use lummi_supabase::SupabaseError;
use serde::Deserialize;
use serde_json::Map;
use tracing::instrument;

use crate::filters;
use crate::middleware::Visitor;
use crate::routes::diagnostic::{DiagnosticForm, SuccessStep};
use crate::state::AppState;

// =============================================================================
// Packages
// =============================================================================

/// A package offer on the landing page.
#[derive(Debug, Clone, Copy)]
pub struct Package {
    pub tier: PackageTier,
    pub price: &'static str,
    pub tagline: &'static str,
    pub features: &'static [&'static str],
    pub popular: bool,
}

pub const PACKAGES: [Package; 3] = [
    Package {
        tier: PackageTier::Starter,
        price: "497",
        tagline: "Pra quem quer começar a se destacar.",
        features: &[
            "1 Edição de Reels (até 30s)",
            "Correção de Cor Básica",
            "2 Fotos Editadas",
            "Entrega em 48h",
        ],
        popular: false,
    },
    Package {
        tier: PackageTier::Pro,
        price: "897",
        tagline: "O favorito para projetos finalizados.",
        features: &[
            "3 Edições de Reels (Pack Mensal)",
            "Color Grading Cinema",
            "Sound Design Imersivo",
            "5 Fotos Editadas",
            "Identidade Visual de Legenda",
        ],
        popular: true,
    },
    Package {
        tier: PackageTier::Legend,
        price: "1.497",
        tagline: "Tratamento de patrocínio oficial.",
        features: &[
            "Cobertura Completa (Remoto*)",
            "Pack de Stories Animados",
            "1 Vídeo Longo (Youtube)",
            "Consultoria de Tráfego",
            "Revisões Ilimitadas",
        ],
        popular: false,
    },
];

/// A package card with its deep link.
#[derive(Debug, Clone)]
pub struct PackageView {
    pub package: Package,
    pub link: String,
}

impl PackageView {
    #[must_use]
    pub fn all(whatsapp_number: &str) -> Vec<Self> {
        PACKAGES
            .iter()
            .map(|package| Self {
                package: *package,
                link: whatsapp::link(whatsapp_number, &whatsapp::package_message(package.tier)),
            })
            .collect()
    }
}

// =============================================================================
// Gallery
// =============================================================================

/// A portfolio card as rendered, with its first-render visibility.
#[derive(Debug, Clone)]
pub struct PortfolioView {
    pub card: PortfolioCard,
    pub hidden: bool,
    pub link: String,
}

impl PortfolioView {
    #[must_use]
    pub fn build(cards: Vec<PortfolioCard>, filter: CategoryFilter, whatsapp_number: &str) -> Vec<Self> {
        cards
            .into_iter()
            .map(|card| Self {
                hidden: !filter.matches(&card),
                link: whatsapp::link(whatsapp_number, &whatsapp::portfolio_message(&card.title)),
                card,
            })
            .collect()
    }
}

/// A gallery filter button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterButton {
    pub tag: &'static str,
    pub active: bool,
}

/// Filter buttons: "ALL" followed by every category.
#[must_use]
pub fn filter_buttons(active: CategoryFilter) -> Vec<FilterButton> {
    std::iter::once(CategoryFilter::All)
        .chain(PortfolioCategory::ALL.into_iter().map(CategoryFilter::Only))
        .map(|filter| FilterButton {
            tag: filter.as_str(),
            active: filter == active,
        })
        .collect()
}

// =============================================================================
// Loading
// =============================================================================

/// Everything the landing page shows that comes from the backend.
#[derive(Debug, Clone)]
pub struct LandingContent {
    pub settings: SiteSettings,
    pub portfolio: Gallery<PortfolioCard>,
    pub testimonials: Gallery<TestimonialCard>,
}

/// Run a backend call under the render budget.
///
/// Failures and timeouts are logged and reported as `None`.
async fn within<T>(
    budget: Duration,
    what: &'static str,
    call: impl Future<Output = Result<T, SupabaseError>>,
) -> Option<T> {
    match tokio::time::timeout(budget, call).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, what, "Landing fetch failed, using fallback");
            None
        }
        Err(_) => {
            tracing::warn!(
                what,
                budget_ms = budget.as_millis(),
                "Landing fetch timed out, using fallback"
            );
            None
        }
    }
}

/// Resolve settings alone, for handlers that only need the number.
pub async fn load_settings(state: &AppState) -> SiteSettings {
    let defaults = SiteSettings::defaults(&state.config().whatsapp_fallback);
    let Some(client) = state.supabase() else {
        return defaults;
    };
    let budget = state.config().render_budget;
    match within(budget, "settings", client.site_settings(&SettingKey::ALL, None)).await {
        Some(rows) => SiteSettings::resolve(defaults, &rows),
        None => defaults,
    }
}

/// Fetch settings, portfolio and testimonials concurrently.
pub async fn load_landing(state: &AppState) -> LandingContent {
    let defaults = SiteSettings::defaults(&state.config().whatsapp_fallback);
    let Some(client) = state.supabase() else {
        return LandingContent {
            settings: defaults,
            portfolio: Gallery::resolve(Err::<Vec<_>, _>(()), PortfolioCard::placeholders),
            testimonials: Gallery::resolve(Err::<Vec<_>, _>(()), TestimonialCard::placeholders),
        };
    };

    let budget = state.config().render_budget;
    let (settings, portfolio, testimonials) = tokio::join!(
        within(budget, "settings", client.site_settings(&SettingKey::ALL, None)),
        within(budget, "portfolio", client.published_portfolio()),
        within(budget, "testimonials", client.published_testimonials()),
    );

    LandingContent {
        settings: match settings {
            Some(rows) => SiteSettings::resolve(defaults, &rows),
            None => defaults,
        },
        portfolio: Gallery::resolve(
            portfolio
                .map(|rows| rows.into_iter().map(PortfolioCard::from_item).collect())
                .ok_or(()),
            PortfolioCard::placeholders,
        ),
        testimonials: Gallery::resolve(
            testimonials
                .map(|rows| rows.into_iter().map(TestimonialCard::from_row).collect())
                .ok_or(()),
            TestimonialCard::placeholders,
        ),
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Landing page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub categoria: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page_id: String,
    pub settings: SiteSettings,
    pub next_window: Option<String>,
    pub capacity_used: i64,
    pub portfolio: Vec<PortfolioView>,
    pub portfolio_is_example: bool,
    pub testimonials: Gallery<TestimonialCard>,
    pub categories: Vec<FilterButton>,
    pub packages: Vec<PackageView>,
    pub whatsapp_link: String,
    pub form: DiagnosticForm,
    pub success: Option<SuccessStep>,
}

/// Display the landing page.
#[instrument(skip(state, visitor, query))]
pub async fn home(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Query(query): Query<HomeQuery>,
) -> HomeTemplate {
    let content = load_landing(&state).await;

    state.analytics().track(
        &visitor,
        EventName::PageView,
        Some(visitor.utm.source_or_direct()),
        Map::new(),
    );

    let filter = CategoryFilter::parse(query.categoria.as_deref());
    let number = content.settings.whatsapp_number.clone();

    HomeTemplate {
        page_id: uuid::Uuid::new_v4().simple().to_string(),
        next_window: content.settings.next_window_label(),
        capacity_used: content.settings.capacity_used(),
        portfolio_is_example: content.portfolio.is_example,
        portfolio: PortfolioView::build(content.portfolio.items, filter, &number),
        testimonials: content.testimonials,
        categories: filter_buttons(filter),
        packages: PackageView::all(&number),
        whatsapp_link: whatsapp::bare_link(&number),
        form: DiagnosticForm::default(),
        success: None,
        settings: content.settings,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_package_links_name_the_package() {
        let packages = PackageView::all("5511999998888");
        assert_eq!(packages.len(), 3);
        assert_eq!(
            packages[1].link,
            "https://wa.me/5511999998888?text=Tenho%20interesse%20no%20pacote%20Pro%20Build"
        );
        assert!(packages[1].package.popular);
        assert!(!packages[0].package.popular);
    }

    #[test]
    fn test_category_filter_marks_cards_hidden() {
        let views = PortfolioView::build(
            PortfolioCard::placeholders(),
            CategoryFilter::Only(PortfolioCategory::Drift),
            "5511999998888",
        );
        let visible: Vec<_> = views.iter().filter(|v| !v.hidden).collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].card.category, Some(PortfolioCategory::Drift));
        // Nothing is dropped, only hidden
        assert_eq!(views.len(), 6);
    }

    #[test]
    fn test_filter_buttons_mark_active() {
        let buttons = filter_buttons(CategoryFilter::parse(Some("STANCE")));
        assert_eq!(buttons.len(), 7);
        assert_eq!(buttons[0].tag, "ALL");
        let active: Vec<_> = buttons.iter().filter(|b| b.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].tag, "STANCE");
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, SupabaseError>(1)
        };
        let result = within(Duration::from_millis(10), "slow", slow).await;
        assert_eq!(result, None);
    }
}
