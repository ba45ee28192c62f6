mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{delete, get, post, put, request, test_app};

#[tokio::test]
async fn requests_without_session_are_rejected() {
    let app = test_app().await;

    let (status, body) = get(&app.router, "/api/categories", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User not logged in");

    let (status, _) = get(&app.router, "/api/categories", Some("beacon-session=bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fresh_install_lists_synthesized_home_default() {
    let app = test_app().await;

    let (status, body) = get(&app.router, "/api/categories", Some(&app.member_cookie)).await;
    assert_eq!(status, StatusCode::OK);
    let categories = body.as_array().expect("array body");
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["name"], "Home");
    assert_eq!(categories[0]["isHidden"], false);
}

#[tokio::test]
async fn create_and_fetch_category() {
    let app = test_app().await;

    let (status, created) = post(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "  Services ", "description": "backend services" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Services");
    assert_eq!(created["description"], "backend services");
    assert_eq!(created["isHidden"], false);

    let (status, body) = get(
        &app.router,
        "/api/categories/Services",
        Some(&app.member_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Services");

    // Home was materialized into the stored collection, first
    let (_, all) = get(&app.router, "/api/categories", Some(&app.member_cookie)).await;
    assert_eq!(all[0]["name"], "Home");
    assert_eq!(all[1]["name"], "Services");
}

#[tokio::test]
async fn create_requires_editor_role() {
    let app = test_app().await;

    let (status, body) = post(
        &app.router,
        "/api/categories",
        Some(&app.member_cookie),
        json!({ "name": "Services" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Only Admins and Editors can perform this action"
    );
}

#[tokio::test]
async fn duplicate_category_conflicts_and_never_overwrites() {
    let app = test_app().await;

    let (status, _) = post(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "Services", "description": "original" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "Services", "description": "imposter" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Category 'Services' already exists");

    let (_, stored) = get(
        &app.router,
        "/api/categories/Services",
        Some(&app.member_cookie),
    )
    .await;
    assert_eq!(stored["description"], "original");
}

#[tokio::test]
async fn creating_home_is_always_a_bad_request() {
    let app = test_app().await;

    let (status, body) = post(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "Home" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Cannot create a category named 'Home' - it already exists as the default category"
    );
}

#[tokio::test]
async fn create_validates_name() {
    let app = test_app().await;

    for payload in [json!({}), json!({ "name": "   " }), json!({ "name": 7 })] {
        let (status, body) = post(
            &app.router,
            "/api/categories",
            Some(&app.editor_cookie),
            payload,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Category name is required and must be a non-empty string"
        );
    }
}

#[tokio::test]
async fn bulk_replace_enforces_home_first() {
    let app = test_app().await;

    let (status, body) = put(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!([{ "name": "Services" }, { "name": "Home" }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "First category must be 'Home'");

    let (status, body) = put(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "Home" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request body must be an array of categories");

    let (status, body) = put(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!([{ "name": "Home" }, { "name": "Services" }, { "name": "Edge" }]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["categories"][0]["name"], "Home");

    let (_, stored) = get(&app.router, "/api/categories", Some(&app.member_cookie)).await;
    assert_eq!(stored[0]["name"], "Home");
    assert_eq!(stored.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn home_cannot_be_renamed_or_deleted_for_any_editing_role() {
    let app = test_app().await;

    // Materialize the stored collection (Home plus one sibling) first
    post(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "Services" }),
    )
    .await;

    for cookie in [&app.admin_cookie, &app.editor_cookie] {
        let (status, body) = put(
            &app.router,
            "/api/categories/Home",
            Some(cookie),
            json!({ "name": "Front" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot rename the 'Home' category");

        let (status, body) = delete(&app.router, "/api/categories/Home", Some(cookie)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot delete the 'Home' category");
    }
}

#[tokio::test]
async fn update_merges_partial_fields() {
    let app = test_app().await;

    post(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "Services", "description": "backend" }),
    )
    .await;

    // PATCH and PUT are aliases; exercise PATCH here
    let (status, updated) = request(
        &app.router,
        "PATCH",
        "/api/categories/Services",
        Some(&app.editor_cookie),
        Some(json!({ "isHidden": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Services");
    assert_eq!(updated["description"], "backend");
    assert_eq!(updated["isHidden"], true);
}

#[tokio::test]
async fn rename_conflicts_with_existing_category() {
    let app = test_app().await;

    for name in ["Services", "Edge"] {
        post(
            &app.router,
            "/api/categories",
            Some(&app.editor_cookie),
            json!({ "name": name }),
        )
        .await;
    }

    let (status, body) = put(
        &app.router,
        "/api/categories/Edge",
        Some(&app.editor_cookie),
        json!({ "name": "Services" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Category 'Services' already exists");
}

#[tokio::test]
async fn missing_category_is_404() {
    let app = test_app().await;

    // Nothing stored yet
    let (status, body) = get(
        &app.router,
        "/api/categories/Services",
        Some(&app.member_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No categories found");

    post(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "Edge" }),
    )
    .await;

    let (status, body) = get(
        &app.router,
        "/api/categories/Services",
        Some(&app.member_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category 'Services' not found");
}

#[tokio::test]
async fn delete_returns_the_removed_category() {
    let app = test_app().await;

    post(
        &app.router,
        "/api/categories",
        Some(&app.editor_cookie),
        json!({ "name": "Edge", "description": "edge pops" }),
    )
    .await;

    let (status, body) = delete(
        &app.router,
        "/api/categories/Edge",
        Some(&app.admin_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Category 'Edge' deleted successfully");
    assert_eq!(body["deleted"]["description"], "edge pops");

    let (status, _) = get(
        &app.router,
        "/api/categories/Edge",
        Some(&app.member_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
