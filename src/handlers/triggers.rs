use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::merge;
use crate::models::{Trigger, TriggerStatus};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Deserialize)]
pub struct TriggerListQuery {
    /// Optional status filter: ACTIVE | INACTIVE
    pub status: Option<String>,
}

/// The id arrives as a path string so a non-numeric value gets the API's
/// own 400 body rather than an extractor rejection.
fn parse_trigger_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("Invalid trigger ID"))
}

/// Store-level unique-name violations become a client-facing conflict.
fn conflict_to_duplicate_name(err: StoreError) -> ApiError {
    match err {
        StoreError::Conflict(_) => {
            ApiError::conflict("A trigger with this name already exists")
        }
        other => other.into(),
    }
}

/// GET /api/triggers - All triggers, optionally filtered by status.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TriggerListQuery>,
) -> ApiResult<Json<Vec<Trigger>>> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(TriggerStatus::from_str(raw).map_err(|_| {
            ApiError::bad_request(format!(
                "Invalid trigger status. Must be one of: {}",
                TriggerStatus::ALLOWED
            ))
        })?),
        None => None,
    };

    Ok(Json(state.store.triggers(status).await?))
}

/// POST /api/triggers - Create a trigger; the store assigns the id.
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    principal.require_editor()?;

    let trigger = merge::new_trigger(&payload)?;
    let created = state
        .store
        .upsert_trigger(&trigger)
        .await
        .map_err(conflict_to_duplicate_name)?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/triggers/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Trigger>> {
    let id = parse_trigger_id(&id)?;
    let trigger = state
        .store
        .trigger_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Trigger with ID {} not found", id)))?;
    Ok(Json(trigger))
}

/// PUT/PATCH /api/triggers/:id - Partial update; the two methods are
/// intentionally identical. Omitted fields keep their stored values.
pub async fn update_one(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<Trigger>> {
    principal.require_editor()?;

    let id = parse_trigger_id(&id)?;
    let existing = state
        .store
        .trigger_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Trigger with ID {} not found", id)))?;

    let merged = merge::merge_trigger(&existing, &payload)?;
    let updated = state
        .store
        .upsert_trigger(&merged)
        .await
        .map_err(conflict_to_duplicate_name)?;

    Ok(Json(updated))
}

/// DELETE /api/triggers/:id
pub async fn delete_one(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    principal.require_editor()?;

    let id = parse_trigger_id(&id)?;
    let existing = state
        .store
        .trigger_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Trigger with ID {} not found", id)))?;

    state.store.delete_trigger(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Trigger '{}' deleted successfully", existing.name),
        "deleted": existing,
    })))
}
