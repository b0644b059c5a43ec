//! Local durable fallback: the whole log collection stored under one key.
//!
//! Every write replaces the previous snapshot (last write wins).

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use trek_core::ActivityLog;

/// Key the log collection is stored under.
pub const SNAPSHOT_KEY: &str = "everest_logs";

#[allow(async_fn_in_trait)]
pub trait SnapshotStore {
    /// Load the collection stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<Vec<ActivityLog>>>;

    /// Replace the collection stored under `key`.
    async fn save(&self, key: &str, logs: &[ActivityLog]) -> Result<()>;
}

/// In-process snapshot store holding serialized collections.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw serialized value under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<ActivityLog>>> {
        let raw = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("snapshot store lock poisoned"))?
            .get(key)
            .cloned();
        raw.map(|value| serde_json::from_str(&value).context("corrupt local snapshot"))
            .transpose()
    }

    async fn save(&self, key: &str, logs: &[ActivityLog]) -> Result<()> {
        let value = serde_json::to_string(logs)?;
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("snapshot store lock poisoned"))?
            .insert(key.to_string(), value);
        Ok(())
    }
}

/// Snapshot store backed by a SQLite key/value table.
#[derive(Clone)]
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the snapshot database at `db_path`.
    pub async fn open(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path);
        info!("Opening local snapshot: {}", db_path);

        // One connection: snapshots are whole-value overwrites
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<ActivityLog>>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM snapshots WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(value,)| serde_json::from_str(&value).context("corrupt local snapshot"))
            .transpose()
    }

    async fn save(&self, key: &str, logs: &[ActivityLog]) -> Result<()> {
        let value = serde_json::to_string(logs)?;
        sqlx::query(
            r#"
            INSERT INTO snapshots (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3
            "#,
        )
        .bind(key)
        .bind(&value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
