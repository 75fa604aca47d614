//! Customer sign-in, sign-up and the account page.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use lummi_integration_tests::{
    FakeSupabase, USER_ID, body_text, form_post, get, location, session_cookie,
};
use lummi_site::config::SiteConfig;
use lummi_site::state::AppState;
use serde_json::json;
use tower::ServiceExt;

const PROFILES_PATH: &str = "/rest/v1/profiles";
const EMAIL: &str = "joao@example.com";

fn site(fake: Option<&FakeSupabase>) -> axum::Router {
    let config = SiteConfig::local(fake.map(FakeSupabase::config));
    lummi_site::app(AppState::new(config).unwrap())
}

async fn sign_in(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            "email=joao%40example.com&password=hunter22",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/account"));
    session_cookie(&response).unwrap()
}

#[tokio::test]
async fn test_unconfigured_backend_shows_setup() {
    for path in ["/login", "/signup", "/account"] {
        let response = site(None).oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{path}");
        let html = body_text(response).await;
        assert!(html.contains("SUPABASE_ANON_KEY"), "{path}");
    }
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let fake = FakeSupabase::start().await;
    let response = site(Some(&fake)).oneshot(get("/account", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_failed_login_shows_backend_message() {
    let fake = FakeSupabase::start().await;
    fake.stub(
        Method::POST,
        "/auth/v1/token",
        400,
        json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
    );

    let response = site(Some(&fake))
        .oneshot(form_post(
            "/login",
            "email=joao%40example.com&password=errada",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Invalid login credentials"));
    assert!(html.contains("joao@example.com"));
}

#[tokio::test]
async fn test_account_shows_profile_and_admin_link() {
    let fake = FakeSupabase::start().await;
    fake.stub_sign_in(EMAIL);
    fake.stub_is_admin(true);
    fake.stub(
        Method::GET,
        PROFILES_PATH,
        200,
        json!([{ "id": USER_ID, "email": EMAIL, "display_name": "João", "city": "São Paulo" }]),
    );
    let app = site(Some(&fake));
    let cookie = sign_in(&app).await;

    let response = app.oneshot(get("/account", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("value=\"João\""));
    assert!(html.contains("value=\"São Paulo\""));
    assert!(html.contains("href=\"http://localhost:3001/admin\""));

    let query = fake.requests_to(&Method::GET, PROFILES_PATH)[0]
        .query
        .clone()
        .unwrap();
    assert!(query.contains(&format!("id=eq.{USER_ID}")));
}

#[tokio::test]
async fn test_privilege_error_hides_admin_link() {
    let fake = FakeSupabase::start().await;
    fake.stub_sign_in(EMAIL);
    fake.stub(
        Method::POST,
        "/rest/v1/rpc/is_admin",
        500,
        json!({ "message": "boom" }),
    );
    let app = site(Some(&fake));
    let cookie = sign_in(&app).await;

    let html = body_text(app.oneshot(get("/account", Some(&cookie))).await.unwrap()).await;
    assert!(html.contains("Minha conta"));
    assert!(!html.contains("Admin &rarr;"));
}

#[tokio::test]
async fn test_profile_update_trims_and_clears() {
    let fake = FakeSupabase::start().await;
    fake.stub_sign_in(EMAIL);
    let app = site(Some(&fake));
    let cookie = sign_in(&app).await;

    let response = app
        .oneshot(form_post(
            "/account",
            "display_name=++Jo%C3%A3o++&city=+++",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Perfil atualizado com sucesso."));

    let patches = fake.requests_to(&Method::PATCH, PROFILES_PATH);
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body["display_name"], "João");
    assert_eq!(patches[0].body["city"], serde_json::Value::Null);
    assert!(patches[0].body["updated_at"].is_string());
    assert_eq!(
        patches[0].authorization.as_deref(),
        Some("Bearer user-access-token")
    );
}

#[tokio::test]
async fn test_signup_sends_display_name() {
    let fake = FakeSupabase::start().await;
    fake.stub(
        Method::POST,
        "/auth/v1/signup",
        200,
        json!({ "id": USER_ID, "email": EMAIL }),
    );

    let response = site(Some(&fake))
        .oneshot(form_post(
            "/signup",
            "email=joao%40example.com&password=hunter22&display_name=Jo%C3%A3o",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Cadastro criado! Verifique seu email para confirmar o acesso."));

    let signups = fake.requests_to(&Method::POST, "/auth/v1/signup");
    assert_eq!(signups.len(), 1);
    assert_eq!(signups[0].body["data"], json!({ "display_name": "João" }));
}

#[tokio::test]
async fn test_logout_signs_out_and_clears_session() {
    let fake = FakeSupabase::start().await;
    fake.stub_sign_in(EMAIL);
    let app = site(Some(&fake));
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(form_post("/logout", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/"));
    assert_eq!(fake.requests_to(&Method::POST, "/auth/v1/logout").len(), 1);

    let response = app.oneshot(get("/account", Some(&cookie))).await.unwrap();
    assert_eq!(location(&response).as_deref(), Some("/login"));
}
