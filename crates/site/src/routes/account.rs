//! Customer account route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use lummi_core::ProfileUpdate;
use lummi_supabase::{AuthSession, SupabaseClient};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireCustomer;
use crate::routes::setup::SetupTemplate;
use crate::state::AppState;

pub const PROFILE_UPDATED_MESSAGE: &str = "Perfil atualizado com sucesso.";
pub const PROFILE_LOAD_ERROR: &str = "Não foi possível carregar seu perfil.";

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub city: String,
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub email: String,
    pub display_name: String,
    pub city: String,
    /// Set only when the privilege check answered `true`.
    pub admin_url: Option<String>,
    pub notice: Option<&'static str>,
    pub error: Option<String>,
}

impl AccountTemplate {
    fn new(auth: &AuthSession, admin_url: Option<String>) -> Self {
        Self {
            email: auth.user.email.clone().unwrap_or_default(),
            display_name: String::new(),
            city: String::new(),
            admin_url,
            notice: None,
            error: None,
        }
    }
}

/// "Admin →" target when the user is an admin. Errors count as not.
async fn admin_link(state: &AppState, client: &SupabaseClient, token: &str) -> Option<String> {
    match client.is_admin(token).await {
        Ok(true) => Some(state.config().admin_url.clone()),
        Ok(false) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Privilege check failed on account page");
            None
        }
    }
}

/// Display the account page.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn show(State(state): State<AppState>, RequireCustomer(auth): RequireCustomer) -> Response {
    let Some(client) = state.supabase() else {
        return SetupTemplate::page();
    };

    let (profile, admin_url) = tokio::join!(
        client.get_profile(auth.user.id, &auth.access_token),
        admin_link(&state, client, &auth.access_token),
    );

    let mut page = AccountTemplate::new(&auth, admin_url);
    match profile {
        Ok(Some(profile)) => {
            if let Some(email) = profile.email {
                page.email = email;
            }
            page.display_name = profile.display_name.unwrap_or_default();
            page.city = profile.city.unwrap_or_default();
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load profile");
            page.error = Some(PROFILE_LOAD_ERROR.to_string());
        }
    }

    page.into_response()
}

/// Update display name and city.
#[instrument(skip(state, auth, form), fields(user_id = %auth.user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Form(form): Form<ProfileForm>,
) -> Response {
    let Some(client) = state.supabase() else {
        return SetupTemplate::page();
    };

    let update = ProfileUpdate::from_form(&form.display_name, &form.city, Utc::now());
    let (result, admin_url) = tokio::join!(
        client.update_profile(auth.user.id, &update, &auth.access_token),
        admin_link(&state, client, &auth.access_token),
    );

    let mut page = AccountTemplate::new(&auth, admin_url);
    page.display_name = update.display_name.unwrap_or_default();
    page.city = update.city.unwrap_or_default();

    match result {
        Ok(()) => {
            tracing::info!("Profile updated");
            page.notice = Some(PROFILE_UPDATED_MESSAGE);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Profile update failed");
            page.error = Some(e.user_message());
        }
    }

    page.into_response()
}
