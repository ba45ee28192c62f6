use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the reserved default category. It always exists, is always
/// first in the stored sequence, and can never be renamed or deleted.
pub const HOME_CATEGORY: &str = "Home";

/// A grouping label for monitors. The collection is stored as an ordered
/// JSON array under the `categories` site-data key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "isHidden", default)]
    pub is_hidden: bool,
}

impl Category {
    /// The synthesized default returned on a fresh install with nothing stored.
    pub fn home_default() -> Self {
        Self {
            name: HOME_CATEGORY.to_string(),
            description: "Monitors for Home Page".to_string(),
            is_hidden: false,
        }
    }

    pub fn is_home(&self) -> bool {
        self.name == HOME_CATEGORY
    }
}

/// Notification/action channel of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Webhook,
    Discord,
    Slack,
    Email,
}

impl TriggerType {
    /// Allowed values, for validation error messages.
    pub const ALLOWED: &'static str = "webhook, discord, slack, email";

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Webhook => "webhook",
            TriggerType::Discord => "discord",
            TriggerType::Slack => "slack",
            TriggerType::Email => "email",
        }
    }
}

impl FromStr for TriggerType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "webhook" => Ok(TriggerType::Webhook),
            "discord" => Ok(TriggerType::Discord),
            "slack" => Ok(TriggerType::Slack),
            "email" => Ok(TriggerType::Email),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerStatus {
    Active,
    Inactive,
}

impl TriggerStatus {
    pub const ALLOWED: &'static str = "ACTIVE, INACTIVE";

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerStatus::Active => "ACTIVE",
            TriggerStatus::Inactive => "INACTIVE",
        }
    }
}

impl FromStr for TriggerStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(TriggerStatus::Active),
            "INACTIVE" => Ok(TriggerStatus::Inactive),
            _ => Err(()),
        }
    }
}

/// A named notification definition, referenced by id from monitor bindings.
///
/// `id` 0 means "not yet created"; the store assigns a real id on insert.
/// `trigger_meta` is an opaque string that must parse as JSON; its internal
/// shape is owned by the notification dispatcher, not this API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: i64,
    pub name: String,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub trigger_desc: String,
    pub trigger_status: TriggerStatus,
    #[serde(default = "default_trigger_meta")]
    pub trigger_meta: String,
}

fn default_trigger_meta() -> String {
    "{}".to_string()
}

/// Monitor row as this subsystem sees it: identity plus the two serialized
/// trigger-binding columns. Everything else about monitors is owned by the
/// check scheduler.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Monitor {
    pub id: i64,
    pub tag: String,
    pub name: String,
    pub down_trigger: Option<String>,
    pub degraded_trigger: Option<String>,
}

/// System-generated alert record; read-only from this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Alert {
    pub id: i64,
    pub monitor_tag: String,
    pub monitor_status: String,
    pub alert_status: String,
    pub health_checks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
