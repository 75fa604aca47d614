//! Landing page against the fake backend.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use lummi_integration_tests::{FakeSupabase, body_text, get};
use lummi_site::config::SiteConfig;
use lummi_site::state::AppState;
use serde_json::json;
use tower::ServiceExt;

const PORTFOLIO_PATH: &str = "/rest/v1/portfolio_items";
const TESTIMONIALS_PATH: &str = "/rest/v1/testimonials";

fn site(fake: Option<&FakeSupabase>) -> axum::Router {
    let config = SiteConfig::local(fake.map(FakeSupabase::config));
    lummi_site::app(AppState::new(config).unwrap())
}

fn example_labels(html: &str) -> usize {
    html.matches("class=\"example-label\"").count()
}

#[tokio::test]
async fn test_empty_tables_render_placeholders() {
    let fake = FakeSupabase::start().await;

    let response = site(Some(&fake)).oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert_eq!(example_labels(&html), 9);
    assert!(html.contains("Midnight Club Civic"));
    assert!(html.contains("Garage Detail"));

    let query = fake.requests_to(&Method::GET, PORTFOLIO_PATH)[0]
        .query
        .clone()
        .unwrap();
    assert!(query.contains("is_published=eq.true"));
    assert!(query.contains("order=order_index.asc"));
}

#[tokio::test]
async fn test_fetch_error_renders_placeholders() {
    let fake = FakeSupabase::start().await;
    fake.stub(Method::GET, PORTFOLIO_PATH, 500, json!({ "message": "boom" }));
    fake.stub(Method::GET, TESTIMONIALS_PATH, 500, json!({ "message": "boom" }));

    let html = body_text(site(Some(&fake)).oneshot(get("/", None)).await.unwrap()).await;
    assert_eq!(example_labels(&html), 9);
    assert!(html.contains("Purple Rain R34"));
}

#[tokio::test]
async fn test_unconfigured_backend_renders_placeholders() {
    let response = site(None).oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(example_labels(&body_text(response).await), 9);
}

#[tokio::test]
async fn test_published_rows_replace_placeholders() {
    let fake = FakeSupabase::start().await;
    fake.stub(
        Method::GET,
        PORTFOLIO_PATH,
        200,
        json!([{
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "title": "Supra Neon",
            "category": "RAIN NIGHT",
            "cover_url": "https://images.unsplash.com/photo-1",
            "order_index": 0,
            "is_published": true
        }]),
    );

    let html = body_text(site(Some(&fake)).oneshot(get("/", None)).await.unwrap()).await;
    assert!(html.contains("Supra Neon"));
    assert!(!html.contains("Midnight Club Civic"));
    // Testimonials are still empty, so only their three placeholders are labeled
    assert_eq!(example_labels(&html), 3);
}

#[tokio::test]
async fn test_capacity_remaining_in_final_cta() {
    let fake = FakeSupabase::start().await;
    fake.stub(
        Method::GET,
        "/rest/v1/site_settings",
        200,
        json!([{ "key": "capacity_remaining", "value": 5 }]),
    );

    let html = body_text(site(Some(&fake)).oneshot(get("/", None)).await.unwrap()).await;
    assert!(html.contains("Restam: 5"));
}

#[tokio::test]
async fn test_odd_rows_and_settings_still_render() {
    let fake = FakeSupabase::start().await;
    fake.stub(
        Method::GET,
        PORTFOLIO_PATH,
        200,
        json!([
            { "id": "0f8fad5b-d9cb-469f-a165-70867728950e", "title": "Supra Neon",
              "category": "rain night", "order_index": null, "is_published": true },
            { "id": "1f8fad5b-d9cb-469f-a165-70867728950e", "title": "Kei Truck",
              "category": "JDM", "cover_url": null, "is_published": null }
        ]),
    );
    fake.stub(
        Method::GET,
        "/rest/v1/site_settings",
        200,
        json!([
            { "key": "capacity_monthly", "value": 9_223_372_036_854_775_807_i64 },
            { "key": "capacity_remaining", "value": -9_223_372_036_854_775_807_i64 }
        ]),
    );

    let response = site(Some(&fake)).oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Supra Neon"));
    assert!(html.contains("Kei Truck"));
    assert!(html.contains(r#"data-category="RAIN NIGHT""#));
    let fallback_cover = lummi_core::types::content::DEFAULT_COVER_URL.replace('&', "&amp;");
    assert!(html.contains(&format!(r#"data-cover="{fallback_cover}""#)));
    // Negative remaining is unusable, so the default applies
    assert!(html.contains("Restam: 12"));
    assert!(html.contains(r#"value="9223372036854775795""#));
}

#[tokio::test]
async fn test_health() {
    let response = site(None).oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}
