//! Admin dashboard: window selection, report rendering and denial.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use lummi_core::DashboardWindow;
use lummi_integration_tests::{FakeSupabase, admin_session, body_text, get};
use serde_json::json;
use tower::ServiceExt;

const DASHBOARD_RPC: &str = "/rest/v1/rpc/get_admin_dashboard";

fn report() -> serde_json::Value {
    json!({
        "summary": { "page_views": 1200, "leads_submitted": 240, "whatsapp_clicks": 90,
                     "lead_rate": 0.2, "whatsapp_rate": 7.5 },
        "whatsapp_by_source": [{ "source": "instagram", "count": 40 }],
        "events_by_source": [{ "source": "google", "count": 700 }],
        "leads_by_status": [{ "status": "new", "count": 12 }]
    })
}

fn requested_days(fake: &FakeSupabase) -> Vec<i64> {
    fake.requests_to(&Method::POST, DASHBOARD_RPC)
        .iter()
        .map(|request| request.body["p_days"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_report_renders_for_window() {
    let fake = FakeSupabase::start().await;
    let (app, cookie) = admin_session(&fake).await;
    fake.stub(Method::POST, DASHBOARD_RPC, 200, report());
    let before = requested_days(&fake).len();

    let response = app
        .oneshot(get("/admin/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    let calls = fake.requests_to(&Method::POST, DASHBOARD_RPC);
    assert_eq!(calls.len(), before + 1);
    assert_eq!(calls[before].body, json!({ "p_days": 7 }));
    assert_eq!(calls[before].authorization.as_deref(), Some("Bearer user-access-token"));

    assert!(html.contains("1.200"));
    assert!(html.contains("20,0%"));
    assert!(html.contains("7,5%"));
    assert!(html.contains("instagram"));
    assert!(html.contains("google"));
    assert!(html.contains(r#"href="/admin/dashboard?days=7" class="active""#));
}

#[tokio::test]
async fn test_days_parameter_picks_window() {
    let fake = FakeSupabase::start().await;
    let (app, cookie) = admin_session(&fake).await;
    fake.stub(Method::POST, DASHBOARD_RPC, 200, report());
    let before = requested_days(&fake).len();

    for uri in [
        "/admin/dashboard?days=30",
        "/admin/dashboard?days=abc",
        "/admin/dashboard?days=90",
    ] {
        let response = app.clone().oneshot(get(uri, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    assert_eq!(
        requested_days(&fake)[before..],
        [
            DashboardWindow::Month.days(),
            DashboardWindow::Week.days(),
            DashboardWindow::Week.days(),
        ]
    );
}

#[tokio::test]
async fn test_empty_window_with_nulls_renders() {
    let fake = FakeSupabase::start().await;
    let (app, cookie) = admin_session(&fake).await;
    fake.stub(
        Method::POST,
        DASHBOARD_RPC,
        200,
        json!({
            "summary": { "page_views": 0, "leads_submitted": 0, "whatsapp_clicks": 0,
                         "lead_rate": null, "whatsapp_rate": null },
            "whatsapp_by_source": null,
            "events_by_source": null,
            "leads_by_status": null
        }),
    );

    let response = app
        .oneshot(get("/admin/dashboard?days=30", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("0,0%"));
    assert!(html.contains("Sem cliques no período."));
    assert!(html.contains("Sem eventos no período."));
    assert!(html.contains("Nenhum lead no período."));
}

#[tokio::test]
async fn test_procedure_refusal_is_a_denial() {
    let fake = FakeSupabase::start().await;
    let (app, cookie) = admin_session(&fake).await;
    fake.stub(
        Method::POST,
        DASHBOARD_RPC,
        400,
        json!({ "code": "P0001", "message": "not_admin" }),
    );

    let response = app
        .oneshot(get("/admin/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let html = body_text(response).await;
    assert!(html.contains("Acesso negado"));
    assert!(html.contains("Seu usuário não tem permissão para acessar o painel administrativo."));
}

#[tokio::test]
async fn test_other_failures_keep_the_page() {
    let fake = FakeSupabase::start().await;
    let (app, cookie) = admin_session(&fake).await;
    fake.stub(Method::POST, DASHBOARD_RPC, 500, json!({ "message": "boom" }));

    let response = app
        .oneshot(get("/admin/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"class="notice notice-error""#));
    assert!(!html.contains("Visualizações"));
}
