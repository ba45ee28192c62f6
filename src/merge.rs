//! Resource update merging and validation.
//!
//! Every mutating route follows the same policy: fields present in the
//! payload replace the stored value, absent fields are retained (PUT and
//! PATCH are intentionally identical aliases), and all validation happens
//! here, strictly before any store call. The merger never persists and has
//! no collection-wide view; uniqueness of a changed name is checked by the
//! caller before writing.

use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Category, Trigger, TriggerStatus, TriggerType, HOME_CATEGORY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("Category name is required and must be a non-empty string")]
    MissingCategoryName,

    #[error("Category name must be a non-empty string")]
    EmptyCategoryName,

    #[error("Cannot rename the 'Home' category")]
    HomeRename,

    #[error("Request body must be an array of categories")]
    CategoriesNotArray,

    #[error("All categories must have a valid name")]
    InvalidCategoryListName,

    #[error("First category must be 'Home'")]
    FirstCategoryNotHome,

    #[error("Trigger name is required and must be a non-empty string")]
    MissingTriggerName,

    #[error("Trigger name cannot be empty")]
    EmptyTriggerName,

    #[error("Trigger type is required")]
    MissingTriggerType,

    #[error("Invalid trigger type. Must be one of: {}", TriggerType::ALLOWED)]
    InvalidTriggerType,

    #[error("Invalid trigger status. Must be one of: {}", TriggerStatus::ALLOWED)]
    InvalidTriggerStatus,

    #[error("trigger_meta must be valid JSON")]
    InvalidTriggerMeta,

    #[error("{side}: {constraint}")]
    Binding {
        side: &'static str,
        constraint: String,
    },
}

/// Which side of a monitor's trigger binding is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSide {
    Down,
    Degraded,
}

impl BindingSide {
    pub fn field(&self) -> &'static str {
        match self {
            BindingSide::Down => "down_trigger",
            BindingSide::Degraded => "degraded_trigger",
        }
    }

    fn expected_type(&self) -> &'static str {
        match self {
            BindingSide::Down => "DOWN",
            BindingSide::Degraded => "DEGRADED",
        }
    }
}

/// Build a new category from a POST payload, applying defaults.
///
/// Reserved-name and duplicate checks are the caller's job; this only
/// validates and normalizes fields.
pub fn new_category(payload: &Value) -> Result<Category, MergeError> {
    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(MergeError::MissingCategoryName)?;

    Ok(Category {
        name: name.to_string(),
        description: payload
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        is_hidden: payload.get("isHidden") == Some(&Value::Bool(true)),
    })
}

/// Merge a partial update into an existing category.
pub fn merge_category(existing: &Category, updates: &Value) -> Result<Category, MergeError> {
    let mut merged = existing.clone();

    if let Some(name) = updates.get("name") {
        let name = name
            .as_str()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(MergeError::EmptyCategoryName)?;

        if existing.is_home() && name != HOME_CATEGORY {
            return Err(MergeError::HomeRename);
        }
        merged.name = name.to_string();
    }

    if let Some(description) = updates.get("description") {
        merged.description = description.as_str().unwrap_or_default().to_string();
    }

    if let Some(hidden) = updates.get("isHidden") {
        merged.is_hidden = hidden == &Value::Bool(true);
    }

    Ok(merged)
}

/// Validate a bulk category replacement: must be an array of named
/// categories with `Home` first. Names are trimmed on the way in.
pub fn category_list(payload: &Value) -> Result<Vec<Category>, MergeError> {
    let entries = payload.as_array().ok_or(MergeError::CategoriesNotArray)?;

    let mut categories = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(MergeError::InvalidCategoryListName)?;

        categories.push(Category {
            name: name.to_string(),
            description: entry
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_hidden: entry.get("isHidden") == Some(&Value::Bool(true)),
        });
    }

    if categories.first().map(|c| c.name.as_str()) != Some(HOME_CATEGORY) {
        return Err(MergeError::FirstCategoryNotHome);
    }

    Ok(categories)
}

/// Build a new trigger from a POST payload, applying defaults. The id is
/// forced to 0 so the store assigns a fresh one.
pub fn new_trigger(payload: &Value) -> Result<Trigger, MergeError> {
    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(MergeError::MissingTriggerName)?;

    let trigger_type = payload
        .get("trigger_type")
        .ok_or(MergeError::MissingTriggerType)?;
    let trigger_type = parse_trigger_type(trigger_type)?;

    let trigger_status = match payload.get("trigger_status") {
        Some(status) => parse_trigger_status(status)?,
        None => TriggerStatus::Active,
    };

    let trigger_meta = match payload.get("trigger_meta") {
        Some(meta) => validated_meta(meta)?,
        None => "{}".to_string(),
    };

    Ok(Trigger {
        id: 0,
        name: name.to_string(),
        trigger_type,
        trigger_desc: payload
            .get("trigger_desc")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        trigger_status,
        trigger_meta,
    })
}

/// Merge a partial update into an existing trigger. Only supplied fields
/// are re-validated; absent fields default to the stored values.
pub fn merge_trigger(existing: &Trigger, updates: &Value) -> Result<Trigger, MergeError> {
    let mut merged = existing.clone();

    if let Some(trigger_type) = updates.get("trigger_type") {
        merged.trigger_type = parse_trigger_type(trigger_type)?;
    }

    if let Some(trigger_status) = updates.get("trigger_status") {
        merged.trigger_status = parse_trigger_status(trigger_status)?;
    }

    if let Some(meta) = updates.get("trigger_meta") {
        merged.trigger_meta = validated_meta(meta)?;
    }

    if let Some(name) = updates.get("name") {
        merged.name = name
            .as_str()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(MergeError::EmptyTriggerName)?
            .to_string();
    }

    if let Some(desc) = updates.get("trigger_desc") {
        merged.trigger_desc = desc.as_str().unwrap_or_default().to_string();
    }

    Ok(merged)
}

fn parse_trigger_type(value: &Value) -> Result<TriggerType, MergeError> {
    value
        .as_str()
        .and_then(|s| TriggerType::from_str(s).ok())
        .ok_or(MergeError::InvalidTriggerType)
}

fn parse_trigger_status(value: &Value) -> Result<TriggerStatus, MergeError> {
    value
        .as_str()
        .and_then(|s| TriggerStatus::from_str(s).ok())
        .ok_or(MergeError::InvalidTriggerStatus)
}

fn validated_meta(value: &Value) -> Result<String, MergeError> {
    let raw = value.as_str().ok_or(MergeError::InvalidTriggerMeta)?;
    serde_json::from_str::<Value>(raw).map_err(|_| MergeError::InvalidTriggerMeta)?;
    Ok(raw.to_string())
}

/// Validate one side of a monitor trigger-binding update.
///
/// The object is stored verbatim on success, so unknown extra fields pass
/// through; only the known fields are constrained.
pub fn validate_binding(config: &Value, side: BindingSide) -> Result<(), MergeError> {
    let binding_err = |constraint: &str| MergeError::Binding {
        side: side.field(),
        constraint: constraint.to_string(),
    };

    let object = config
        .as_object()
        .ok_or_else(|| binding_err("Trigger configuration must be an object"))?;

    if let Some(trigger_type) = object.get("trigger_type") {
        if trigger_type.as_str() != Some(side.expected_type()) {
            return Err(binding_err(&format!(
                "trigger_type must be \"{}\"",
                side.expected_type()
            )));
        }
    }

    for field in ["failureThreshold", "successThreshold"] {
        if let Some(threshold) = object.get(field) {
            if threshold.as_i64().map_or(true, |n| n < 1) {
                return Err(binding_err(&format!("{} must be a number >= 1", field)));
            }
        }
    }

    if let Some(create_incident) = object.get("createIncident") {
        if !matches!(create_incident.as_str(), Some("YES") | Some("NO")) {
            return Err(binding_err("createIncident must be 'YES' or 'NO'"));
        }
    }

    if let Some(active) = object.get("active") {
        if !active.is_boolean() {
            return Err(binding_err("active must be a boolean"));
        }
    }

    if let Some(triggers) = object.get("triggers") {
        let ids = triggers
            .as_array()
            .ok_or_else(|| binding_err("triggers must be an array"))?;
        if !ids.iter().all(|id| id.as_i64().is_some_and(|n| n > 0)) {
            return Err(binding_err(
                "triggers array must contain positive numbers (trigger IDs)",
            ));
        }
    }

    Ok(())
}
