mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};

use beacon_api::models::Alert;
use common::{get, test_app, TestApp};

async fn seed_alerts(app: &TestApp, count: i64) {
    let base = Utc::now();
    for i in 0..count {
        app.store
            .add_alert(Alert {
                id: i + 1,
                monitor_tag: "web".to_string(),
                monitor_status: "DOWN".to_string(),
                alert_status: "TRIGGERED".to_string(),
                health_checks: 3,
                created_at: base - Duration::minutes(count - i),
                updated_at: base - Duration::minutes(count - i),
            })
            .await;
    }
}

#[tokio::test]
async fn alerts_require_a_session() {
    let app = test_app().await;
    let (status, _) = get(&app.router, "/api/alerts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn default_pagination() {
    let app = test_app().await;
    seed_alerts(&app, 25).await;

    let (status, body) = get(&app.router, "/api/alerts", Some(&app.member_cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alerts"].as_array().unwrap().len(), 20);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 20);
    assert_eq!(body["pagination"]["total"], 25);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNext"], true);
    assert_eq!(body["pagination"]["hasPrev"], false);

    // Newest alert first
    assert_eq!(body["alerts"][0]["id"], 25);
}

#[tokio::test]
async fn last_page_flags() {
    let app = test_app().await;
    seed_alerts(&app, 25).await;

    let (status, body) = get(
        &app.router,
        "/api/alerts?page=2&limit=20",
        Some(&app.member_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alerts"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], true);
}

#[tokio::test]
async fn oversized_limit_is_clamped() {
    let app = test_app().await;
    seed_alerts(&app, 3).await;

    let (status, body) = get(
        &app.router,
        "/api/alerts?page=1&limit=200",
        Some(&app.member_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["totalPages"], 1);
}

#[tokio::test]
async fn invalid_pagination_params() {
    let app = test_app().await;

    for path in [
        "/api/alerts?page=0",
        "/api/alerts?page=-1",
        "/api/alerts?page=abc",
    ] {
        let (status, body) = get(&app.router, path, Some(&app.member_cookie)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid page number. Must be >= 1");
    }

    for path in ["/api/alerts?limit=0", "/api/alerts?limit=abc"] {
        let (status, body) = get(&app.router, path, Some(&app.member_cookie)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid limit. Must be >= 1");
    }
}

#[tokio::test]
async fn empty_alert_history() {
    let app = test_app().await;

    let (status, body) = get(&app.router, "/api/alerts", Some(&app.member_cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alerts"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["totalPages"], 0);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], false);
}
