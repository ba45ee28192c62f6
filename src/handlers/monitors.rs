use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::merge::{self, BindingSide};
use crate::models::Monitor;
use crate::state::AppState;
use crate::store::BindingUpdate;

/// Lenient read of a stored binding column: a value that fails to parse is
/// logged and rendered as null instead of failing the whole response.
/// Writes stay strict; this asymmetry is deliberate policy.
fn parse_stored_binding(raw: Option<&str>, side: BindingSide) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("Ignoring unparseable stored {}: {}", side.field(), err);
            Value::Null
        }
    }
}

fn bindings_body(monitor: &Monitor) -> Value {
    json!({
        "monitor_id": monitor.id,
        "monitor_tag": monitor.tag,
        "monitor_name": monitor.name,
        "down_trigger": parse_stored_binding(monitor.down_trigger.as_deref(), BindingSide::Down),
        "degraded_trigger": parse_stored_binding(
            monitor.degraded_trigger.as_deref(),
            BindingSide::Degraded,
        ),
    })
}

async fn monitor_or_404(state: &AppState, tag: &str) -> Result<Monitor, ApiError> {
    state
        .store
        .monitor_by_tag(tag)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Monitor with tag '{}' not found", tag)))
}

/// GET /api/monitors/:tag/triggers - Trigger bindings for one monitor.
pub async fn get_bindings(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> ApiResult<Json<Value>> {
    let monitor = monitor_or_404(&state, &tag).await?;
    Ok(Json(bindings_body(&monitor)))
}

/// PUT/PATCH /api/monitors/:tag/triggers - Update one or both binding
/// sides; the two methods are intentionally identical.
///
/// Each side is independent: an absent key leaves that side untouched, an
/// explicit null clears it, and an object is validated then stored verbatim
/// (unknown extra fields pass through).
pub async fn update_bindings(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(tag): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<Value>> {
    principal.require_editor()?;

    let lock_key = format!("monitor:{}:triggers", tag);
    let _guard = state.locks.acquire(&lock_key).await;

    let monitor = monitor_or_404(&state, &tag).await?;

    let mut update = BindingUpdate::default();
    for side in [BindingSide::Down, BindingSide::Degraded] {
        if let Some(config) = payload.get(side.field()) {
            let stored = if config.is_null() {
                None
            } else {
                merge::validate_binding(config, side)?;
                Some(config.to_string())
            };
            match side {
                BindingSide::Down => update.down_trigger = Some(stored),
                BindingSide::Degraded => update.degraded_trigger = Some(stored),
            }
        }
    }

    state
        .store
        .update_monitor_triggers(monitor.id, &update)
        .await?;

    let updated = monitor_or_404(&state, &tag).await?;
    let mut body = bindings_body(&updated);
    body["success"] = Value::Bool(true);
    Ok(Json(body))
}
