//! Authentication route handlers for admin.
//!
//! Password sign-in against the backend, followed by the privilege check.
//! A valid user who is not an admin is signed straight back out.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use lummi_supabase::{AuthSession, SupabaseClient};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{login_rate_limiter, set_admin_session};
use crate::models::session_keys;
use crate::routes::render;
use crate::routes::setup::SetupTemplate;
use crate::state::AppState;

pub const NOT_ADMIN_MESSAGE: &str = "Sem permissão para acessar o painel.";
pub const SESSION_ERROR_MESSAGE: &str = "Não foi possível iniciar a sessão. Tente novamente.";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, Default)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/login",
            get(login_page).post(login).layer(login_rate_limiter()),
        )
        .route("/admin/logout", post(logout))
}

/// Render the login page.
///
/// GET /admin/login
async fn login_page(State(state): State<AppState>) -> Response {
    if state.supabase().is_none() {
        return SetupTemplate::page();
    }
    render(&LoginTemplate::default()).into_response()
}

/// Sign in, then require the admin privilege.
///
/// POST /admin/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let Some(client) = state.supabase() else {
        return SetupTemplate::page();
    };

    let auth = match client
        .sign_in_with_password(form.email.trim(), &form.password)
        .await
    {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "Admin login failed");
            return login_error(form.email, e.user_message());
        }
    };

    match client.is_admin(&auth.access_token).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(user_id = %auth.user.id, "Non-admin login refused");
            sign_out_quietly(client, &auth).await;
            return login_error(form.email, NOT_ADMIN_MESSAGE.to_string());
        }
        Err(e) => {
            tracing::warn!(error = %e, user_id = %auth.user.id, "Privilege check failed at login");
            sign_out_quietly(client, &auth).await;
            return login_error(form.email, NOT_ADMIN_MESSAGE.to_string());
        }
    }

    if let Err(e) = set_admin_session(&session, &auth).await {
        tracing::error!(error = %e, "Failed to store admin session");
        return login_error(form.email, SESSION_ERROR_MESSAGE.to_string());
    }

    set_sentry_user(&auth.user.id, auth.user.email.as_deref());
    tracing::info!(user_id = %auth.user.id, "Admin signed in");
    Redirect::to("/admin/dashboard").into_response()
}

fn login_error(email: String, message: String) -> Response {
    render(&LoginTemplate {
        email,
        error: Some(message),
    })
    .into_response()
}

async fn sign_out_quietly(client: &SupabaseClient, auth: &AuthSession) {
    if let Err(e) = client.sign_out(&auth.access_token).await {
        tracing::warn!(error = %e, "Backend sign-out failed");
    }
}

/// Sign out and clear the session.
///
/// POST /admin/logout
async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    let auth: Option<AuthSession> = session
        .get(session_keys::ADMIN_SESSION)
        .await
        .ok()
        .flatten();

    if let (Some(auth), Some(client)) = (auth, state.supabase()) {
        sign_out_quietly(client, &auth).await;
    }

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush admin session");
    }
    clear_sentry_user();

    Redirect::to("/admin/login")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_template_shows_error() {
        let html = LoginTemplate {
            email: "ana@projetolummi.com.br".to_string(),
            error: Some(NOT_ADMIN_MESSAGE.to_string()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Sem permissão para acessar o painel."));
        assert!(html.contains("value=\"ana@projetolummi.com.br\""));
    }
}
