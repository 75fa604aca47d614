//! Portfolio route handlers.
//!
//! The list supports inline publish and order changes. Everything else goes
//! through the edit dialog, which saves the whole record at once. The media
//! URL field is free-form JSON and must parse before anything is sent.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use lummi_core::{
    NewPortfolioItem, PortfolioCategory, PortfolioItem, PortfolioItemId, parse_media_urls,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Flash, FlashError, FlashNotice, FlashQuery, with_error, with_notice};
use crate::routes::{Layout, render};
use crate::state::AppState;

pub const INVALID_JSON_MESSAGE: &str = "JSON inválido.";
pub const INVALID_ORDER_MESSAGE: &str = "Informe um número válido.";

const PORTFOLIO_PATH: &str = "/admin/portfolio";

/// One row of the list.
#[derive(Debug, Clone)]
pub struct PortfolioRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub cover_url: String,
    pub order_index: i32,
    pub is_published: bool,
}

impl From<&PortfolioItem> for PortfolioRow {
    fn from(item: &PortfolioItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone().unwrap_or_default(),
            category: item.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
            cover_url: item.cover_url.clone().unwrap_or_default(),
            order_index: item.order_index,
            is_published: item.is_published,
        }
    }
}

/// Category select option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Values in the edit dialog, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order_index: String,
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub is_published: Option<String>,
    #[serde(default)]
    pub media_urls: String,
}

impl PortfolioForm {
    fn from_item(item: &PortfolioItem) -> Self {
        Self {
            title: item.title.clone().unwrap_or_default(),
            category: item.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
            cover_url: item.cover_url.clone().unwrap_or_default(),
            description: item.description.clone().unwrap_or_default(),
            order_index: item.order_index.to_string(),
            is_published: item.is_published.then(|| "on".to_string()),
            media_urls: item.media_urls_text(),
        }
    }

    /// Build the full record, or the messages that block the save.
    fn into_item(self, id: PortfolioItemId) -> Result<PortfolioItem, DraftErrors> {
        let media_urls = parse_media_urls(&self.media_urls);
        let order_index = self.order_index.trim().parse::<i32>();

        match (media_urls, order_index) {
            (Ok(media_urls), Ok(order_index)) => Ok(PortfolioItem {
                id,
                title: non_empty(&self.title),
                category: self.category.parse::<PortfolioCategory>().ok(),
                cover_url: non_empty(&self.cover_url),
                description: non_empty(&self.description),
                order_index,
                is_published: self.is_published.is_some(),
                media_urls,
            }),
            (media_urls, order_index) => Err(DraftErrors {
                media_urls: media_urls.err().map(|_| INVALID_JSON_MESSAGE),
                order_index: order_index.err().map(|_| INVALID_ORDER_MESSAGE),
            }),
        }
    }

    fn category_options(&self) -> Vec<CategoryOption> {
        let current = self.category.parse::<PortfolioCategory>().ok();
        PortfolioCategory::ALL
            .into_iter()
            .map(|category| CategoryOption {
                value: category.as_str(),
                selected: Some(category) == current,
            })
            .collect()
    }
}

/// Inline messages in the edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftErrors {
    pub media_urls: Option<&'static str>,
    pub order_index: Option<&'static str>,
}

/// The open edit dialog.
#[derive(Debug, Clone)]
pub struct PortfolioDraft {
    pub id: String,
    pub form: PortfolioForm,
    pub categories: Vec<CategoryOption>,
    pub errors: DraftErrors,
    pub error_message: Option<String>,
}

impl PortfolioDraft {
    fn new(id: PortfolioItemId, form: PortfolioForm, errors: DraftErrors) -> Self {
        Self {
            id: id.to_string(),
            categories: form.category_options(),
            form,
            errors,
            error_message: None,
        }
    }
}

/// Portfolio list template, optionally with the edit dialog open.
#[derive(Template)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate {
    pub layout: Layout,
    pub items: Vec<PortfolioRow>,
    pub draft: Option<PortfolioDraft>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishForm {
    pub publish: bool,
}

#[derive(Debug, Deserialize)]
pub struct OrderForm {
    pub order_index: String,
}

/// Build the portfolio router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(PORTFOLIO_PATH, get(list).post(create))
        .route("/admin/portfolio/{id}/publish", post(set_published))
        .route("/admin/portfolio/{id}/order", post(set_order))
        .route("/admin/portfolio/{id}/edit", get(edit).post(save))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Render the list, with `draft` as the open dialog.
async fn render_page(
    state: &AppState,
    auth: &lummi_supabase::AuthSession,
    flash: Flash,
    draft: Option<PortfolioDraft>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    let (items, error) = match client.list_portfolio(&auth.access_token).await {
        Ok(items) => (items.iter().map(PortfolioRow::from).collect(), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load portfolio");
            (Vec::new(), Some(e.user_message()))
        }
    };

    render(&PortfolioTemplate {
        layout: Layout::new(auth, PORTFOLIO_PATH, state, flash),
        items,
        draft,
        error,
    })
    .into_response()
}

/// GET /admin/portfolio
#[instrument(skip(state, auth, query))]
async fn list(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Query(query): Query<FlashQuery>,
) -> Response {
    render_page(&state, &auth, Flash::from_query(&query), None).await
}

/// Insert an unpublished draft after the last item.
///
/// POST /admin/portfolio
#[instrument(skip(state, auth))]
async fn create(State(state): State<AppState>, RequireAdmin(auth): RequireAdmin) -> Redirect {
    let Some(client) = state.supabase() else {
        return Redirect::to(&with_error(PORTFOLIO_PATH, FlashError::CreateFailed));
    };

    let result = match client.list_portfolio(&auth.access_token).await {
        Ok(existing) => {
            client
                .create_portfolio_item(&NewPortfolioItem::draft(&existing), &auth.access_token)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            tracing::info!("Portfolio draft created");
            Redirect::to(&with_notice(PORTFOLIO_PATH, FlashNotice::PortfolioCreated))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create portfolio draft");
            Redirect::to(&with_error(PORTFOLIO_PATH, FlashError::CreateFailed))
        }
    }
}

/// POST /admin/portfolio/{id}/publish
#[instrument(skip(state, auth, form))]
async fn set_published(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<PortfolioItemId>,
    Form(form): Form<PublishForm>,
) -> Redirect {
    patch(&state, &auth, id, &json!({ "is_published": form.publish })).await
}

/// POST /admin/portfolio/{id}/order
#[instrument(skip(state, auth, form))]
async fn set_order(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<PortfolioItemId>,
    Form(form): Form<OrderForm>,
) -> Redirect {
    let Ok(order_index) = form.order_index.trim().parse::<i32>() else {
        return Redirect::to(&with_error(PORTFOLIO_PATH, FlashError::InvalidOrder));
    };
    patch(&state, &auth, id, &json!({ "order_index": order_index })).await
}

async fn patch(
    state: &AppState,
    auth: &lummi_supabase::AuthSession,
    id: PortfolioItemId,
    body: &serde_json::Value,
) -> Redirect {
    let Some(client) = state.supabase() else {
        return Redirect::to(&with_error(PORTFOLIO_PATH, FlashError::SaveFailed));
    };

    match client
        .update_portfolio_item(id, body, &auth.access_token)
        .await
    {
        Ok(()) => Redirect::to(&with_notice(PORTFOLIO_PATH, FlashNotice::PortfolioUpdated)),
        Err(e) => {
            tracing::warn!(error = %e, item_id = %id, "Failed to update portfolio item");
            Redirect::to(&with_error(PORTFOLIO_PATH, FlashError::SaveFailed))
        }
    }
}

/// Open the edit dialog over the list.
///
/// GET /admin/portfolio/{id}/edit
#[instrument(skip(state, auth))]
async fn edit(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<PortfolioItemId>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    match client.get_portfolio_item(id, &auth.access_token).await {
        Ok(Some(item)) => {
            let draft = PortfolioDraft::new(id, PortfolioForm::from_item(&item), DraftErrors::default());
            render_page(&state, &auth, Flash::default(), Some(draft)).await
        }
        Ok(None) => Redirect::to(&with_error(PORTFOLIO_PATH, FlashError::NotFound)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, item_id = %id, "Failed to load portfolio item");
            Redirect::to(&with_error(PORTFOLIO_PATH, FlashError::NotFound)).into_response()
        }
    }
}

/// Save the dialog. Invalid JSON keeps the dialog open and sends nothing.
///
/// POST /admin/portfolio/{id}/edit
#[instrument(skip(state, auth, form))]
async fn save(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<PortfolioItemId>,
    Form(form): Form<PortfolioForm>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    let item = match form.clone().into_item(id) {
        Ok(item) => item,
        Err(errors) => {
            tracing::debug!(item_id = %id, ?errors, "Portfolio draft rejected");
            let draft = PortfolioDraft::new(id, form, errors);
            return render_page(&state, &auth, Flash::default(), Some(draft)).await;
        }
    };

    match client.upsert_portfolio_item(&item, &auth.access_token).await {
        Ok(()) => {
            tracing::info!(item_id = %id, "Portfolio item saved");
            Redirect::to(&with_notice(PORTFOLIO_PATH, FlashNotice::PortfolioUpdated)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, item_id = %id, "Failed to save portfolio item");
            let mut draft = PortfolioDraft::new(id, form, DraftErrors::default());
            draft.error_message = Some(e.user_message());
            render_page(&state, &auth, Flash::default(), Some(draft)).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id() -> PortfolioItemId {
        "7b0c6f2e-3f55-4d2b-9c1a-0d8f2f1f4a11".parse().unwrap()
    }

    fn form() -> PortfolioForm {
        PortfolioForm {
            title: " Civic Si Night ".to_string(),
            category: "RAIN NIGHT".to_string(),
            cover_url: "https://cdn.example.com/civic.jpg".to_string(),
            description: String::new(),
            order_index: "3".to_string(),
            is_published: Some("on".to_string()),
            media_urls: r#"["https://cdn.example.com/1.jpg"]"#.to_string(),
        }
    }

    #[test]
    fn test_valid_form_builds_full_record() {
        let item = form().into_item(id()).unwrap();
        assert_eq!(item.title.as_deref(), Some("Civic Si Night"));
        assert_eq!(item.category, Some(PortfolioCategory::RainNight));
        assert_eq!(item.description, None);
        assert_eq!(item.order_index, 3);
        assert!(item.is_published);
        assert_eq!(item.media_urls, Some(json!(["https://cdn.example.com/1.jpg"])));
    }

    #[test]
    fn test_empty_media_json_clears_column() {
        let item = PortfolioForm {
            media_urls: "   ".to_string(),
            is_published: None,
            ..form()
        }
        .into_item(id())
        .unwrap();
        assert_eq!(item.media_urls, None);
        assert!(!item.is_published);
    }

    #[test]
    fn test_invalid_media_json_blocks_save() {
        let errors = PortfolioForm {
            media_urls: "[\"https://cdn.example.com/1.jpg\"".to_string(),
            ..form()
        }
        .into_item(id())
        .unwrap_err();
        assert_eq!(errors.media_urls, Some(INVALID_JSON_MESSAGE));
        assert_eq!(errors.order_index, None);
    }

    #[test]
    fn test_category_options_mark_current() {
        let selected: Vec<&str> = form()
            .category_options()
            .into_iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, vec!["RAIN NIGHT"]);
    }

    #[test]
    fn test_dialog_renders_json_error() {
        let errors = DraftErrors {
            media_urls: Some(INVALID_JSON_MESSAGE),
            order_index: None,
        };
        let html = PortfolioTemplate {
            layout: Layout {
                admin_email: "ana@projetolummi.com.br".to_string(),
                current_path: PORTFOLIO_PATH,
                site_url: "http://localhost:3000".to_string(),
                flash: Flash::default(),
            },
            items: Vec::new(),
            draft: Some(PortfolioDraft::new(id(), form(), errors)),
            error: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("JSON inválido."));
        assert!(html.contains("<dialog"));
    }
}
