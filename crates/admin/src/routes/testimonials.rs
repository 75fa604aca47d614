//! Testimonial route handlers.
//!
//! Same shape as the portfolio screen without the media field.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use lummi_core::{NewTestimonial, Testimonial, TestimonialId};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Flash, FlashError, FlashNotice, FlashQuery, with_error, with_notice};
use crate::routes::{Layout, render};
use crate::state::AppState;

const TESTIMONIALS_PATH: &str = "/admin/testimonials";

#[derive(Debug, Clone)]
pub struct TestimonialRow {
    pub id: String,
    pub name: String,
    pub vehicle: String,
    pub quote: String,
    pub order_index: i32,
    pub is_published: bool,
}

impl From<&Testimonial> for TestimonialRow {
    fn from(row: &Testimonial) -> Self {
        Self {
            id: row.id.to_string(),
            name: row.name.clone().unwrap_or_default(),
            vehicle: row.vehicle.clone().unwrap_or_default(),
            quote: row.quote.clone().unwrap_or_default(),
            order_index: row.order_index,
            is_published: row.is_published,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestimonialForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vehicle: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub order_index: String,
    #[serde(default)]
    pub is_published: Option<String>,
}

impl TestimonialForm {
    fn from_row(row: &Testimonial) -> Self {
        Self {
            name: row.name.clone().unwrap_or_default(),
            vehicle: row.vehicle.clone().unwrap_or_default(),
            quote: row.quote.clone().unwrap_or_default(),
            order_index: row.order_index.to_string(),
            is_published: row.is_published.then(|| "on".to_string()),
        }
    }

    /// The full record, or `None` when the order is not a number.
    fn into_row(self, id: TestimonialId) -> Option<Testimonial> {
        let order_index = self.order_index.trim().parse::<i32>().ok()?;
        Some(Testimonial {
            id,
            name: non_empty(&self.name),
            vehicle: non_empty(&self.vehicle),
            quote: non_empty(&self.quote),
            order_index,
            is_published: self.is_published.is_some(),
        })
    }
}

/// The open edit dialog.
#[derive(Debug, Clone)]
pub struct TestimonialDraft {
    pub id: String,
    pub form: TestimonialForm,
    pub order_error: Option<&'static str>,
    pub error_message: Option<String>,
}

impl TestimonialDraft {
    fn new(id: TestimonialId, form: TestimonialForm) -> Self {
        Self {
            id: id.to_string(),
            form,
            order_error: None,
            error_message: None,
        }
    }
}

#[derive(Template)]
#[template(path = "testimonials.html")]
pub struct TestimonialsTemplate {
    pub layout: Layout,
    pub items: Vec<TestimonialRow>,
    pub draft: Option<TestimonialDraft>,
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

/// Build the testimonials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(TESTIMONIALS_PATH, get(list).post(create))
        .route("/admin/testimonials/{id}/publish", post(set_published))
        .route("/admin/testimonials/{id}/order", post(set_order))
        .route("/admin/testimonials/{id}/edit", get(edit).post(save))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

async fn render_page(
    state: &AppState,
    auth: &lummi_supabase::AuthSession,
    flash: Flash,
    draft: Option<TestimonialDraft>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    let (items, error) = match client.list_testimonials(&auth.access_token).await {
        Ok(rows) => (rows.iter().map(TestimonialRow::from).collect(), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load testimonials");
            (Vec::new(), Some(e.user_message()))
        }
    };

    render(&TestimonialsTemplate {
        layout: Layout::new(auth, TESTIMONIALS_PATH, state, flash),
        items,
        draft,
        error,
    })
    .into_response()
}

/// GET /admin/testimonials
#[instrument(skip(state, auth, query))]
async fn list(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Query(query): Query<FlashQuery>,
) -> Response {
    render_page(&state, &auth, Flash::from_query(&query), None).await
}

/// POST /admin/testimonials
#[instrument(skip(state, auth))]
async fn create(State(state): State<AppState>, RequireAdmin(auth): RequireAdmin) -> Redirect {
    let Some(client) = state.supabase() else {
        return Redirect::to(&with_error(TESTIMONIALS_PATH, FlashError::CreateFailed));
    };

    let result = match client.list_testimonials(&auth.access_token).await {
        Ok(existing) => {
            client
                .create_testimonial(&NewTestimonial::draft(&existing), &auth.access_token)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            tracing::info!("Testimonial draft created");
            Redirect::to(&with_notice(TESTIMONIALS_PATH, FlashNotice::TestimonialCreated))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create testimonial draft");
            Redirect::to(&with_error(TESTIMONIALS_PATH, FlashError::CreateFailed))
        }
    }
}

/// POST /admin/testimonials/{id}/publish
#[instrument(skip(state, auth, form))]
async fn set_published(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<TestimonialId>,
    Form(form): Form<PublishForm>,
) -> Redirect {
    patch(&state, &auth, id, &json!({ "is_published": form.publish })).await
}

/// POST /admin/testimonials/{id}/order
#[instrument(skip(state, auth, form))]
async fn set_order(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<TestimonialId>,
    Form(form): Form<OrderForm>,
) -> Redirect {
    let Ok(order_index) = form.order_index.trim().parse::<i32>() else {
        return Redirect::to(&with_error(TESTIMONIALS_PATH, FlashError::InvalidOrder));
    };
    patch(&state, &auth, id, &json!({ "order_index": order_index })).await
}

async fn patch(
    state: &AppState,
    auth: &lummi_supabase::AuthSession,
    id: TestimonialId,
    body: &serde_json::Value,
) -> Redirect {
    let Some(client) = state.supabase() else {
        return Redirect::to(&with_error(TESTIMONIALS_PATH, FlashError::SaveFailed));
    };

    match client.update_testimonial(id, body, &auth.access_token).await {
        Ok(()) => Redirect::to(&with_notice(TESTIMONIALS_PATH, FlashNotice::TestimonialUpdated)),
        Err(e) => {
            tracing::warn!(error = %e, testimonial_id = %id, "Failed to update testimonial");
            Redirect::to(&with_error(TESTIMONIALS_PATH, FlashError::SaveFailed))
        }
    }
}

/// GET /admin/testimonials/{id}/edit
#[instrument(skip(state, auth))]
async fn edit(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<TestimonialId>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    match client.get_testimonial(id, &auth.access_token).await {
        Ok(Some(row)) => {
            let draft = TestimonialDraft::new(id, TestimonialForm::from_row(&row));
            render_page(&state, &auth, Flash::default(), Some(draft)).await
        }
        Ok(None) => {
            Redirect::to(&with_error(TESTIMONIALS_PATH, FlashError::NotFound)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, testimonial_id = %id, "Failed to load testimonial");
            Redirect::to(&with_error(TESTIMONIALS_PATH, FlashError::NotFound)).into_response()
        }
    }
}

/// POST /admin/testimonials/{id}/edit
#[instrument(skip(state, auth, form))]
async fn save(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<TestimonialId>,
    Form(form): Form<TestimonialForm>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    let Some(row) = form.clone().into_row(id) else {
        let mut draft = TestimonialDraft::new(id, form);
        draft.order_error = Some(FlashError::InvalidOrder.message());
        return render_page(&state, &auth, Flash::default(), Some(draft)).await;
    };

    match client.upsert_testimonial(&row, &auth.access_token).await {
        Ok(()) => {
            tracing::info!(testimonial_id = %id, "Testimonial saved");
            Redirect::to(&with_notice(TESTIMONIALS_PATH, FlashNotice::TestimonialUpdated))
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, testimonial_id = %id, "Failed to save testimonial");
            let mut draft = TestimonialDraft::new(id, form);
            draft.error_message = Some(e.user_message());
            render_page(&state, &auth, Flash::default(), Some(draft)).await
        }
    }
}
