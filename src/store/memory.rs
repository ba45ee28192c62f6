use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BindingUpdate, DataStore, StoreError};
use crate::auth::{Principal, SessionStore};
use crate::models::{Alert, Monitor, Trigger, TriggerStatus};

/// In-memory `DataStore`. Backs the integration tests and local tinkering;
/// mirrors the SQLite implementation's semantics, including unique trigger
/// names and id assignment on insert.
#[derive(Debug, Default)]
pub struct MemoryStore {
    site_data: RwLock<HashMap<String, String>>,
    triggers: RwLock<Vec<Trigger>>,
    monitors: RwLock<Vec<Monitor>>,
    alerts: RwLock<Vec<Alert>>,
    next_trigger_id: AtomicI64,
    next_monitor_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_trigger_id: AtomicI64::new(1),
            next_monitor_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Seed a monitor as the check scheduler would; returns the assigned id.
    pub async fn add_monitor(
        &self,
        tag: &str,
        name: &str,
        down_trigger: Option<&str>,
        degraded_trigger: Option<&str>,
    ) -> i64 {
        let id = self.next_monitor_id.fetch_add(1, Ordering::Relaxed);
        self.monitors.write().await.push(Monitor {
            id,
            tag: tag.to_string(),
            name: name.to_string(),
            down_trigger: down_trigger.map(str::to_string),
            degraded_trigger: degraded_trigger.map(str::to_string),
        });
        id
    }

    /// Seed a system-generated alert record.
    pub async fn add_alert(&self, alert: Alert) {
        self.alerts.write().await.push(alert);
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn site_data(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.site_data.read().await.get(key).cloned())
    }

    async fn put_site_data(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.site_data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn alerts_page(&self, page: i64, limit: i64) -> Result<(Vec<Alert>, i64), StoreError> {
        let alerts = self.alerts.read().await;
        let total = alerts.len() as i64;

        let mut ordered: Vec<Alert> = alerts.clone();
        ordered.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let offset = ((page - 1) * limit).max(0) as usize;
        let page_rows = ordered
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page_rows, total))
    }

    async fn triggers(&self, status: Option<TriggerStatus>) -> Result<Vec<Trigger>, StoreError> {
        let triggers = self.triggers.read().await;
        Ok(triggers
            .iter()
            .filter(|t| status.map_or(true, |s| t.trigger_status == s))
            .cloned()
            .collect())
    }

    async fn trigger_by_id(&self, id: i64) -> Result<Option<Trigger>, StoreError> {
        Ok(self
            .triggers
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn upsert_trigger(&self, trigger: &Trigger) -> Result<Trigger, StoreError> {
        let mut triggers = self.triggers.write().await;

        if triggers
            .iter()
            .any(|t| t.name == trigger.name && t.id != trigger.id)
        {
            return Err(StoreError::Conflict(
                "UNIQUE constraint failed: triggers.name".to_string(),
            ));
        }

        let mut stored = trigger.clone();
        if trigger.id == 0 {
            stored.id = self.next_trigger_id.fetch_add(1, Ordering::Relaxed);
            triggers.push(stored.clone());
        } else {
            let existing = triggers
                .iter_mut()
                .find(|t| t.id == trigger.id)
                .ok_or_else(|| StoreError::NotFound(format!("trigger {}", trigger.id)))?;
            *existing = stored.clone();
        }
        Ok(stored)
    }

    async fn delete_trigger(&self, id: i64) -> Result<(), StoreError> {
        let mut triggers = self.triggers.write().await;
        let before = triggers.len();
        triggers.retain(|t| t.id != id);
        if triggers.len() == before {
            return Err(StoreError::NotFound(format!("trigger {}", id)));
        }
        Ok(())
    }

    async fn monitor_by_tag(&self, tag: &str) -> Result<Option<Monitor>, StoreError> {
        Ok(self
            .monitors
            .read()
            .await
            .iter()
            .find(|m| m.tag == tag)
            .cloned())
    }

    async fn update_monitor_triggers(
        &self,
        id: i64,
        update: &BindingUpdate,
    ) -> Result<(), StoreError> {
        let mut monitors = self.monitors.write().await;
        let monitor = monitors
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("monitor {}", id)))?;

        if let Some(down) = &update.down_trigger {
            monitor.down_trigger = down.clone();
        }
        if let Some(degraded) = &update.degraded_trigger {
            monitor.degraded_trigger = degraded.clone();
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory session store: token -> principal, no expiry.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Principal>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for the principal and return its opaque token.
    pub async fn issue(&self, principal: Principal) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), principal);
        token
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn principal_for(&self, token: &str) -> Result<Option<Principal>, StoreError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }
}
