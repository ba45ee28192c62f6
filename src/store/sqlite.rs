use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::{BindingUpdate, DataStore, StoreError};
use crate::auth::{Principal, Role, SessionStore};
use crate::config;
use crate::models::{Alert, Monitor, Trigger, TriggerStatus};

/// SQLite-backed store. All queries are runtime-bound (no compile-time
/// macros) so the crate builds without a database present.
pub struct SqliteStore {
    pool: SqlitePool,
}

// Kept aligned with the schema the monitoring engine writes; this API only
// creates what is missing on a fresh database.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS site_data (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS triggers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        trigger_type TEXT NOT NULL,
        trigger_desc TEXT NOT NULL DEFAULT '',
        trigger_status TEXT NOT NULL DEFAULT 'ACTIVE',
        trigger_meta TEXT NOT NULL DEFAULT '{}'
    )",
    "CREATE TABLE IF NOT EXISTS monitors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tag TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        down_trigger TEXT,
        degraded_trigger TEXT
    )",
    "CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        monitor_tag TEXT NOT NULL,
        monitor_status TEXT NOT NULL,
        alert_status TEXT NOT NULL,
        health_checks INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY,
        role TEXT NOT NULL DEFAULT 'member'
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        expires_at TEXT NOT NULL
    )",
];

#[derive(sqlx::FromRow)]
struct TriggerRow {
    id: i64,
    name: String,
    trigger_type: String,
    trigger_desc: String,
    trigger_status: String,
    trigger_meta: String,
}

impl TryFrom<TriggerRow> for Trigger {
    type Error = StoreError;

    fn try_from(row: TriggerRow) -> Result<Self, Self::Error> {
        let trigger_type = row
            .trigger_type
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("unknown trigger_type '{}'", row.trigger_type)))?;
        let trigger_status = row
            .trigger_status
            .parse()
            .map_err(|_| {
                StoreError::Corrupt(format!("unknown trigger_status '{}'", row.trigger_status))
            })?;
        Ok(Trigger {
            id: row.id,
            name: row.name,
            trigger_type,
            trigger_status,
            trigger_desc: row.trigger_desc,
            trigger_meta: row.trigger_meta,
        })
    }
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config::config().database.max_connections)
            .connect(url)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        info!("Connected to database at {}", url);
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn map_unique(err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.message().to_lowercase().contains("unique") {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Sqlx(err)
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn site_data(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<(String,)> =
            sqlx::query_as("SELECT value FROM site_data WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value.map(|(v,)| v))
    }

    async fn put_site_data(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO site_data (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn alerts_page(&self, page: i64, limit: i64) -> Result<(Vec<Alert>, i64), StoreError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM alerts")
            .fetch_one(&self.pool)
            .await?;

        let alerts: Vec<Alert> = sqlx::query_as(
            "SELECT id, monitor_tag, monitor_status, alert_status, health_checks,
                    created_at, updated_at
             FROM alerts
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await?;

        Ok((alerts, total))
    }

    async fn triggers(&self, status: Option<TriggerStatus>) -> Result<Vec<Trigger>, StoreError> {
        let rows: Vec<TriggerRow> = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT id, name, trigger_type, trigger_desc, trigger_status, trigger_meta
                     FROM triggers WHERE trigger_status = ? ORDER BY id",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, name, trigger_type, trigger_desc, trigger_status, trigger_meta
                     FROM triggers ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(Trigger::try_from).collect()
    }

    async fn trigger_by_id(&self, id: i64) -> Result<Option<Trigger>, StoreError> {
        let row: Option<TriggerRow> = sqlx::query_as(
            "SELECT id, name, trigger_type, trigger_desc, trigger_status, trigger_meta
             FROM triggers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Trigger::try_from).transpose()
    }

    async fn upsert_trigger(&self, trigger: &Trigger) -> Result<Trigger, StoreError> {
        let mut stored = trigger.clone();
        if trigger.id == 0 {
            let result = sqlx::query(
                "INSERT INTO triggers (name, trigger_type, trigger_desc, trigger_status, trigger_meta)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&trigger.name)
            .bind(trigger.trigger_type.as_str())
            .bind(&trigger.trigger_desc)
            .bind(trigger.trigger_status.as_str())
            .bind(&trigger.trigger_meta)
            .execute(&self.pool)
            .await
            .map_err(Self::map_unique)?;
            stored.id = result.last_insert_rowid();
        } else {
            let result = sqlx::query(
                "UPDATE triggers
                 SET name = ?, trigger_type = ?, trigger_desc = ?, trigger_status = ?, trigger_meta = ?
                 WHERE id = ?",
            )
            .bind(&trigger.name)
            .bind(trigger.trigger_type.as_str())
            .bind(&trigger.trigger_desc)
            .bind(trigger.trigger_status.as_str())
            .bind(&trigger.trigger_meta)
            .bind(trigger.id)
            .execute(&self.pool)
            .await
            .map_err(Self::map_unique)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(format!("trigger {}", trigger.id)));
            }
        }
        Ok(stored)
    }

    async fn delete_trigger(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM triggers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("trigger {}", id)));
        }
        Ok(())
    }

    async fn monitor_by_tag(&self, tag: &str) -> Result<Option<Monitor>, StoreError> {
        let monitor: Option<Monitor> = sqlx::query_as(
            "SELECT id, tag, name, down_trigger, degraded_trigger FROM monitors WHERE tag = ?",
        )
        .bind(tag)
        .fetch_optional(&self.pool)
        .await?;
        Ok(monitor)
    }

    async fn update_monitor_triggers(
        &self,
        id: i64,
        update: &BindingUpdate,
    ) -> Result<(), StoreError> {
        // Two independent columns; callers hold the per-monitor lock, so
        // sequential statements are fine here.
        if let Some(down) = &update.down_trigger {
            sqlx::query("UPDATE monitors SET down_trigger = ? WHERE id = ?")
                .bind(down.as_deref())
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        if let Some(degraded) = &update.degraded_trigger {
            sqlx::query("UPDATE monitors SET degraded_trigger = ? WHERE id = ?")
                .bind(degraded.as_deref())
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn principal_for(&self, token: &str) -> Result<Option<Principal>, StoreError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT u.username, u.role
             FROM sessions s
             JOIN users u ON u.username = s.username
             WHERE s.token = ? AND s.expires_at > datetime('now')",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(username, role)| Principal {
            username,
            role: Role::from_db(&role),
        }))
    }
}
