//! Admin settings routes.
//!
//! Four `site_settings` rows edited as one form. Nothing is written unless
//! every field validates.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use lummi_core::{SettingKey, SettingsErrors, SettingsInput};
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Flash, FlashNotice, FlashQuery, with_notice};
use crate::routes::{Layout, render};
use crate::state::AppState;

pub const REVIEW_FIELDS_MESSAGE: &str = "Revise os campos obrigatórios.";

const SETTINGS_PATH: &str = "/admin/settings";

/// Settings page template.
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub layout: Layout,
    pub input: SettingsInput,
    pub errors: SettingsErrors,
    pub error_message: Option<String>,
}

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route(SETTINGS_PATH, get(settings_page).post(save_settings))
}

/// Render the settings form, prefilled from stored rows.
///
/// GET /admin/settings
#[instrument(skip(state, auth, query))]
async fn settings_page(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Query(query): Query<FlashQuery>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    let (input, error_message) = match client
        .site_settings(&SettingKey::ALL, Some(&auth.access_token))
        .await
    {
        Ok(rows) => (SettingsInput::from_rows(&rows), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load settings");
            (SettingsInput::default(), Some(e.user_message()))
        }
    };

    render(&SettingsTemplate {
        layout: Layout::new(&auth, SETTINGS_PATH, &state, Flash::from_query(&query)),
        input,
        errors: SettingsErrors::default(),
        error_message,
    })
    .into_response()
}

/// Validate and upsert all four settings.
///
/// POST /admin/settings
#[instrument(skip(state, auth, input))]
async fn save_settings(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Form(input): Form<SettingsInput>,
) -> Response {
    let Some(client) = state.supabase() else {
        return AppError::Unconfigured.into_response();
    };

    let rows = match input.validate() {
        Ok(rows) => rows,
        Err(errors) => {
            tracing::debug!(?errors, "Settings form rejected");
            return render(&SettingsTemplate {
                layout: Layout::new(&auth, SETTINGS_PATH, &state, Flash::default()),
                input,
                errors,
                error_message: Some(REVIEW_FIELDS_MESSAGE.to_string()),
            })
            .into_response();
        }
    };

    match client
        .upsert_settings(&rows, Some(&auth.access_token))
        .await
    {
        Ok(()) => {
            tracing::info!(user_id = %auth.user.id, "Site settings saved");
            Redirect::to(&with_notice(SETTINGS_PATH, FlashNotice::SettingsSaved)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save settings");
            render(&SettingsTemplate {
                layout: Layout::new(&auth, SETTINGS_PATH, &state, Flash::default()),
                input,
                errors: SettingsErrors::default(),
                error_message: Some(e.user_message()),
            })
            .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::Layout;

    fn layout() -> Layout {
        Layout {
            admin_email: "ana@projetolummi.com.br".to_string(),
            current_path: SETTINGS_PATH,
            site_url: "http://localhost:3000".to_string(),
            flash: Flash::default(),
        }
    }

    #[test]
    fn test_invalid_form_renders_field_errors() {
        let input = SettingsInput {
            whatsapp_number: "11 9999-8888".to_string(),
            capacity_monthly: "quarenta".to_string(),
            capacity_remaining: "12".to_string(),
            next_window: String::new(),
        };
        let errors = input.validate().unwrap_err();
        let html = SettingsTemplate {
            layout: layout(),
            input,
            errors,
            error_message: Some(REVIEW_FIELDS_MESSAGE.to_string()),
        }
        .render()
        .unwrap();

        assert!(html.contains("Revise os campos obrigatórios."));
        assert!(html.contains("Use apenas números."));
        assert!(html.contains("Informe um número válido."));
        assert!(html.contains("Obrigatório."));
        assert!(html.contains("value=\"quarenta\""));
    }
}
