//! Integration tests for Lummi.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lummi-integration-tests
//! ```
//!
//! No external services are needed. [`FakeSupabase`] serves the `PostgREST`,
//! RPC and `GoTrue` endpoints from an axum server on `127.0.0.1:0` and records
//! every request it receives. The real site and admin routers are pointed at
//! it and driven with `tower::ServiceExt::oneshot`.
//!
//! # Test Categories
//!
//! - `site_landing` - Gallery fallback and settings on the landing page
//! - `site_diagnostic` - Lead intake, honeypot and `WhatsApp` handoff
//! - `site_account` - Customer sign-in, sign-up and profile
//! - `admin_gate` - Sign-in and the per-request privilege check
//! - `admin_content` - Portfolio, testimonial and settings writes
//! - `admin_leads` - Lead paging, filters and status changes
//! - `admin_dashboard` - Dashboard window, report rendering and denial

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    body::{Body, Bytes, to_bytes},
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use lummi_admin::config::AdminConfig;
use lummi_supabase::SupabaseConfig;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Key handed to the clients under test.
pub const ANON_KEY: &str = "test-anon-key-2f9c1e7a";

/// User id returned by the fake token endpoint.
pub const USER_ID: &str = "6a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";

/// Admin account used by [`admin_session`].
pub const ADMIN_EMAIL: &str = "ana@projetolummi.com.br";

/// A request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// `Range` header of paged reads.
    pub range: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Stub {
    method: Method,
    path: String,
    status: StatusCode,
    body: Value,
}

#[derive(Debug, Default)]
struct FakeState {
    requests: Mutex<Vec<RecordedRequest>>,
    stubs: Mutex<Vec<Stub>>,
}

impl FakeState {
    fn stub_for(&self, method: &Method, path: &str) -> Option<Stub> {
        self.stubs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|stub| stub.method == method && stub.path == path)
            .cloned()
    }
}

/// In-process stand-in for a Supabase project.
///
/// Unstubbed reads return `[]`, unstubbed inserts `201`, patches `204`.
/// The most recent stub for a method and path wins, so a test can change an
/// answer halfway through.
pub struct FakeSupabase {
    url: String,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeSupabase {
    /// Bind to an ephemeral loopback port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind fake Supabase");
        let addr = listener.local_addr().expect("Listener has no address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{addr}"),
            state,
            server,
        }
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the local URL does not parse, which cannot happen.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn config(&self) -> SupabaseConfig {
        SupabaseConfig::new(&self.url, SecretString::from(ANON_KEY)).expect("Valid local URL")
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn stub(&self, method: Method, path: &str, status: u16, body: Value) {
        self.state
            .stubs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Stub {
                method,
                path: path.to_string(),
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
                body,
            });
    }

    /// Make the password grant succeed for `email`.
    pub fn stub_sign_in(&self, email: &str) {
        self.stub(Method::POST, "/auth/v1/token", 200, token_response(email));
    }

    /// Set the answer of the `is_admin` procedure.
    pub fn stub_is_admin(&self, is_admin: bool) {
        self.stub(Method::POST, "/rest/v1/rpc/is_admin", 200, json!(is_admin));
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests for one method and path.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }

    /// Requests that would change `path`: inserts, upserts and patches.
    #[must_use]
    pub fn writes_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path && request.method != Method::GET)
            .collect()
    }
}

impl Drop for FakeSupabase {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(str::to_string),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            range: headers
                .get(header::RANGE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });

    if let Some(stub) = state.stub_for(&method, &path) {
        return (stub.status, Json(stub.body)).into_response();
    }

    match method {
        Method::GET => Json(json!([])).into_response(),
        Method::PATCH => StatusCode::NO_CONTENT.into_response(),
        Method::POST if path.starts_with("/rest/v1/rpc/") => (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "PGRST202", "message": "function not stubbed" })),
        )
            .into_response(),
        Method::POST => StatusCode::CREATED.into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

/// `GoTrue` token response for a one-hour session.
#[must_use]
pub fn token_response(email: &str) -> Value {
    json!({
        "access_token": "user-access-token",
        "refresh_token": "user-refresh-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": USER_ID, "email": email, "user_metadata": {} }
    })
}

/// Read a response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read.
#[allow(clippy::expect_used)]
pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `name=value` of the first `Set-Cookie` header, for replaying a session.
#[must_use]
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// A urlencoded form POST.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[allow(clippy::expect_used)]
#[must_use]
pub fn form_post(uri: &str, form: &str, cookie: Option<&str>) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(form.to_string()))
        .expect("Valid request")
}

/// A GET, optionally with a session cookie.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[allow(clippy::expect_used)]
#[must_use]
pub fn get(uri: &str, cookie: Option<&str>) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("Valid request")
}

/// The admin router against `fake`, signed in as [`ADMIN_EMAIL`].
///
/// Returns the router and the session cookie.
///
/// # Panics
///
/// Panics if the app cannot be built or the sign-in does not set a session.
#[allow(clippy::expect_used)]
pub async fn admin_session(fake: &FakeSupabase) -> (Router, String) {
    fake.stub_sign_in(ADMIN_EMAIL);
    fake.stub_is_admin(true);

    let state = lummi_admin::state::AppState::new(AdminConfig::local(Some(fake.config())))
        .expect("Admin state");
    let app = lummi_admin::app(state);
    let response = app
        .clone()
        .oneshot(form_post(
            "/admin/login",
            "email=ana%40projetolummi.com.br&password=hunter22",
            None,
        ))
        .await
        .expect("Login request");
    let cookie = session_cookie(&response).expect("Session cookie");
    (app, cookie)
}
