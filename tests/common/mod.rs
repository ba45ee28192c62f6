use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use beacon_api::app::app;
use beacon_api::auth::{Principal, Role};
use beacon_api::config;
use beacon_api::state::AppState;
use beacon_api::store::{MemorySessionStore, MemoryStore};

/// In-process test fixture: the real router over the in-memory store, with
/// one session per role. No network, no database file.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub admin_cookie: String,
    pub editor_cookie: String,
    pub member_cookie: String,
}

pub async fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let sessions = Arc::new(MemorySessionStore::new());

    let admin_cookie = issue_cookie(&sessions, "root", Role::Admin).await;
    let editor_cookie = issue_cookie(&sessions, "ops", Role::Editor).await;
    let member_cookie = issue_cookie(&sessions, "viewer", Role::Member).await;

    let state = AppState::new(store.clone(), sessions);
    TestApp {
        router: app(state),
        store,
        admin_cookie,
        editor_cookie,
        member_cookie,
    }
}

async fn issue_cookie(sessions: &MemorySessionStore, username: &str, role: Role) -> String {
    let token = sessions
        .issue(Principal {
            username: username.to_string(),
            role,
        })
        .await;
    format!("{}={}", config::config().session.cookie_name, token)
}

/// Send one request through the router and decode the JSON body.
pub async fn request(
    router: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router error");
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };

    (status, value)
}

pub async fn get(router: &Router, path: &str, cookie: Option<&str>) -> (StatusCode, Value) {
    request(router, "GET", path, cookie, None).await
}

pub async fn post(
    router: &Router,
    path: &str,
    cookie: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    request(router, "POST", path, cookie, Some(body)).await
}

pub async fn put(
    router: &Router,
    path: &str,
    cookie: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    request(router, "PUT", path, cookie, Some(body)).await
}

pub async fn delete(router: &Router, path: &str, cookie: Option<&str>) -> (StatusCode, Value) {
    request(router, "DELETE", path, cookie, None).await
}
