//! Customer authentication route handlers.
//!
//! Email and password sign-in, sign-up and sign-out against the backend's
//! auth service. Failures are shown inline with the backend's own message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use lummi_supabase::{AuthSession, SignUpOutcome};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::set_auth_session;
use crate::models::session_keys;
use crate::routes::setup::SetupTemplate;
use crate::state::AppState;

pub const SIGNUP_SUCCESS_MESSAGE: &str =
    "Cadastro criado! Verifique seu email para confirmar o acesso.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate, Default)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate, Default)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub email: String,
    pub display_name: String,
    pub error: Option<String>,
    pub success: Option<&'static str>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(State(state): State<AppState>) -> Response {
    if state.supabase().is_none() {
        return SetupTemplate::page();
    }
    LoginTemplate::default().into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let Some(client) = state.supabase() else {
        return SetupTemplate::page();
    };

    match client
        .sign_in_with_password(form.email.trim(), &form.password)
        .await
    {
        Ok(auth) => {
            if let Err(e) = set_auth_session(&session, &auth).await {
                tracing::error!(error = %e, "Failed to store auth session");
                return LoginTemplate {
                    email: form.email,
                    error: Some("Não foi possível iniciar a sessão. Tente novamente.".to_string()),
                }
                .into_response();
            }
            set_sentry_user(&auth.user.id, auth.user.email.as_deref());
            tracing::info!(user_id = %auth.user.id, "Customer signed in");
            Redirect::to("/account").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            LoginTemplate {
                email: form.email,
                error: Some(e.user_message()),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(State(state): State<AppState>) -> Response {
    if state.supabase().is_none() {
        return SetupTemplate::page();
    }
    SignupTemplate::default().into_response()
}

/// Handle sign-up form submission.
///
/// When the backend signs the new user in straight away the session is
/// stored too; either way the page tells them to confirm their email.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let Some(client) = state.supabase() else {
        return SetupTemplate::page();
    };

    let display_name = form.display_name.trim();
    let display_name = (!display_name.is_empty()).then_some(display_name);

    match client
        .sign_up(form.email.trim(), &form.password, display_name)
        .await
    {
        Ok(outcome) => {
            if let SignUpOutcome::SignedIn(auth) = &outcome {
                store_signed_in(&session, auth).await;
            }
            tracing::info!("Customer signed up");
            SignupTemplate {
                success: Some(SIGNUP_SUCCESS_MESSAGE),
                ..SignupTemplate::default()
            }
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            SignupTemplate {
                email: form.email,
                display_name: form.display_name,
                error: Some(e.user_message()),
                success: None,
            }
            .into_response()
        }
    }
}

async fn store_signed_in(session: &Session, auth: &AuthSession) {
    match set_auth_session(session, auth).await {
        Ok(()) => set_sentry_user(&auth.user.id, auth.user.email.as_deref()),
        Err(e) => tracing::warn!(error = %e, "Failed to store auth session after sign-up"),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// The backend logout is best effort; the local session is flushed
/// regardless.
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    let auth: Option<AuthSession> = session
        .get(session_keys::AUTH_SESSION)
        .await
        .ok()
        .flatten();

    if let (Some(auth), Some(client)) = (auth, state.supabase())
        && let Err(e) = client.sign_out(&auth.access_token).await
    {
        tracing::warn!(error = %e, "Backend sign-out failed");
    }

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    Redirect::to("/")
}
