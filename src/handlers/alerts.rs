use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Pagination params arrive as raw strings so that malformed values can be
/// answered with the API's own error bodies instead of an extractor
/// rejection.
#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/alerts - Paginated alert history.
///
/// Alerts are read-only here; they are produced by the monitor checks.
/// `limit` above the configured cap is silently clamped, not rejected.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> ApiResult<Json<Value>> {
    let pagination = &config::config().pagination;

    let page = match query.page {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| ApiError::bad_request("Invalid page number. Must be >= 1"))?,
        None => 1,
    };

    let mut limit = match query.limit {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|l| *l >= 1)
            .ok_or_else(|| ApiError::bad_request("Invalid limit. Must be >= 1"))?,
        None => pagination.default_limit,
    };
    if limit > pagination.max_limit {
        limit = pagination.max_limit;
    }

    let (alerts, total) = state.store.alerts_page(page, limit).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(json!({
        "alerts": alerts,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total_pages,
            "hasNext": page < total_pages,
            "hasPrev": page > 1,
        }
    })))
}
