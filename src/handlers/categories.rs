use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::merge;
use crate::models::{Category, HOME_CATEGORY};
use crate::state::AppState;
use crate::store::DataStore;

/// Site-data key the ordered category array is stored under.
const CATEGORIES_KEY: &str = "categories";

async fn load_categories(store: &dyn DataStore) -> Result<Option<Vec<Category>>, ApiError> {
    match store.site_data(CATEGORIES_KEY).await? {
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|err| {
            tracing::error!("Stored categories are not valid JSON: {}", err);
            ApiError::internal("An error occurred while processing your request")
        }),
        None => Ok(None),
    }
}

async fn save_categories(
    store: &dyn DataStore,
    categories: &[Category],
) -> Result<(), ApiError> {
    let raw = serde_json::to_string(categories).map_err(|err| {
        tracing::error!("Failed to serialize categories: {}", err);
        ApiError::internal("An error occurred while processing your request")
    })?;
    store.put_site_data(CATEGORIES_KEY, &raw).await?;
    Ok(())
}

/// GET /api/categories - All categories, in stored order.
///
/// A fresh install with nothing stored answers with the synthesized `Home`
/// default without persisting it; the first write persists whatever
/// collection it builds.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = load_categories(&*state.store)
        .await?
        .unwrap_or_else(|| vec![Category::home_default()]);
    Ok(Json(categories))
}

/// POST /api/categories - Create a category.
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    principal.require_editor()?;

    let category = merge::new_category(&payload)?;

    let _guard = state.locks.acquire(CATEGORIES_KEY).await;
    let mut categories = load_categories(&*state.store)
        .await?
        .unwrap_or_else(|| vec![Category::home_default()]);

    // The reserved default wins over the generic duplicate check
    if category.is_home() {
        return Err(ApiError::bad_request(
            "Cannot create a category named 'Home' - it already exists as the default category",
        ));
    }

    if categories.iter().any(|c| c.name == category.name) {
        return Err(ApiError::conflict(format!(
            "Category '{}' already exists",
            category.name
        )));
    }

    categories.push(category.clone());
    save_categories(&*state.store, &categories).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories - Replace the whole ordered collection.
pub async fn replace_all(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<Value>> {
    principal.require_editor()?;

    let categories = merge::category_list(&payload)?;

    let _guard = state.locks.acquire(CATEGORIES_KEY).await;
    save_categories(&*state.store, &categories).await?;

    Ok(Json(json!({ "success": true, "categories": categories })))
}

/// GET /api/categories/:name - One category by name.
pub async fn get_one(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Category>> {
    let categories = load_categories(&*state.store)
        .await?
        .ok_or_else(|| ApiError::not_found("No categories found"))?;

    let category = categories
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| ApiError::not_found(format!("Category '{}' not found", name)))?;

    Ok(Json(category))
}

/// PUT/PATCH /api/categories/:name - Partial update; the two methods are
/// intentionally identical.
pub async fn update_one(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<Category>> {
    principal.require_editor()?;

    let _guard = state.locks.acquire(CATEGORIES_KEY).await;
    let mut categories = load_categories(&*state.store)
        .await?
        .ok_or_else(|| ApiError::not_found("No categories found"))?;

    let index = categories
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| ApiError::not_found(format!("Category '{}' not found", name)))?;

    let merged = merge::merge_category(&categories[index], &payload)?;

    // Renames must not collide with another category
    if merged.name != name
        && categories
            .iter()
            .enumerate()
            .any(|(i, c)| i != index && c.name == merged.name)
    {
        return Err(ApiError::conflict(format!(
            "Category '{}' already exists",
            merged.name
        )));
    }

    categories[index] = merged.clone();
    save_categories(&*state.store, &categories).await?;

    Ok(Json(merged))
}

/// DELETE /api/categories/:name
pub async fn delete_one(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    principal.require_editor()?;

    if name == HOME_CATEGORY {
        return Err(ApiError::bad_request("Cannot delete the 'Home' category"));
    }

    let _guard = state.locks.acquire(CATEGORIES_KEY).await;
    let mut categories = load_categories(&*state.store)
        .await?
        .ok_or_else(|| ApiError::not_found("No categories found"))?;

    let index = categories
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| ApiError::not_found(format!("Category '{}' not found", name)))?;

    let deleted = categories.remove(index);
    save_categories(&*state.store, &categories).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Category '{}' deleted successfully", name),
        "deleted": deleted,
    })))
}
