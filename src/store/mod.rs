use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{Alert, Monitor, Trigger, TriggerStatus};

pub mod memory;
pub mod sqlite;

pub use memory::{MemorySessionStore, MemoryStore};
pub use sqlite::SqliteStore;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique-constraint violation; the message is the store's own.
    #[error("{0}")]
    Conflict(String),

    #[error("Stored data corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Per-monitor trigger-binding write. Outer `None` leaves a side untouched;
/// `Some(None)` clears it; `Some(Some(json))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct BindingUpdate {
    pub down_trigger: Option<Option<String>>,
    pub degraded_trigger: Option<Option<String>>,
}

/// Storage seam for everything this API persists or reads. Handlers never
/// touch SQL; they speak this trait, which also lets the integration tests
/// run against the in-memory implementation.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Read a raw site-data value by key (e.g. the categories JSON array).
    async fn site_data(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace a site-data value.
    async fn put_site_data(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// One page of alerts, newest first, plus the total row count.
    async fn alerts_page(&self, page: i64, limit: i64) -> Result<(Vec<Alert>, i64), StoreError>;

    async fn triggers(&self, status: Option<TriggerStatus>) -> Result<Vec<Trigger>, StoreError>;

    async fn trigger_by_id(&self, id: i64) -> Result<Option<Trigger>, StoreError>;

    /// Insert (id 0) or update (id > 0) a trigger; returns the stored row.
    /// Duplicate names surface as `StoreError::Conflict`.
    async fn upsert_trigger(&self, trigger: &Trigger) -> Result<Trigger, StoreError>;

    async fn delete_trigger(&self, id: i64) -> Result<(), StoreError>;

    async fn monitor_by_tag(&self, tag: &str) -> Result<Option<Monitor>, StoreError>;

    async fn update_monitor_triggers(
        &self,
        id: i64,
        update: &BindingUpdate,
    ) -> Result<(), StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Per-key async mutex registry.
///
/// The store guarantees atomicity for single get/put calls only, so the
/// read-modify-write sequences on shared collections (the categories array,
/// a monitor's binding columns) take a key-scoped lock here to avoid lost
/// updates between concurrent writers.
#[derive(Debug, Default)]
pub struct CollectionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CollectionLocks {
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
