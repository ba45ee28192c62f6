use axum::{
    extract::State, http::StatusCode, middleware, response::IntoResponse, routing::get, Json,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{alerts, categories, monitors, triggers};
use crate::middleware::session_auth_middleware;
use crate::state::AppState;

/// Assemble the full router. Everything under /api requires a session; the
/// banner and health probe are public.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/alerts", get(alerts::list))
        .route(
            "/categories",
            get(categories::list)
                .post(categories::create)
                .put(categories::replace_all),
        )
        .route(
            "/categories/:name",
            get(categories::get_one)
                .put(categories::update_one)
                .patch(categories::update_one)
                .delete(categories::delete_one),
        )
        .route("/triggers", get(triggers::list).post(triggers::create))
        .route(
            "/triggers/:id",
            get(triggers::get_one)
                .put(triggers::update_one)
                .patch(triggers::update_one)
                .delete(triggers::delete_one),
        )
        .route(
            "/monitors/:tag/triggers",
            get(monitors::get_bindings)
                .put(monitors::update_bindings)
                .patch(monitors::update_bindings),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_auth_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Beacon Management API",
        "version": version,
        "endpoints": {
            "alerts": "/api/alerts?page&limit (read-only)",
            "categories": "/api/categories[/:name]",
            "triggers": "/api/triggers[/:id]",
            "monitor_triggers": "/api/monitors/:tag/triggers",
            "health": "/health (public)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => {
            tracing::error!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "error": "database unavailable" })),
            )
        }
    }
}
