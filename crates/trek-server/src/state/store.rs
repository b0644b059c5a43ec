//! In-memory log board using DashMap, with SQLite write-through.

use anyhow::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use trek_core::{ActivityLog, ChangeEvent, LogPatch};

use crate::config::Config;
use crate::persistence::{self, Database};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

/// Application state - thread-safe store for activity logs.
pub struct AppState {
    logs: DashMap<String, ActivityLog>,
    db: Option<Database>,
    tx: broadcast::Sender<ChangeEvent>,
    config: Config,
}

impl AppState {
    /// State without persistence; contents are lost on restart.
    pub fn new(config: Config) -> Self {
        let (tx, _) = broadcast::channel(config.feed_capacity.max(1));
        Self {
            logs: DashMap::new(),
            db: None,
            tx,
            config,
        }
    }

    pub fn with_database(db: Database, config: Config) -> Self {
        let mut state = Self::new(config);
        state.db = Some(db);
        state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Populate the cache from the database. Returns the number of logs loaded.
    pub async fn load_from_database(&self) -> Result<usize> {
        let Some(db) = self.db.as_ref() else {
            return Ok(0);
        };
        let logs = persistence::logs::load_all_logs(db.pool()).await?;
        let count = logs.len();
        for log in logs {
            self.logs.insert(log.id.clone(), log);
        }
        tracing::info!("Loaded {} logs from database", count);
        Ok(count)
    }

    /// Subscribe to change events for every successful write.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    fn publish(&self, event: ChangeEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    /// All logs ordered by timestamp ascending, id as tiebreak.
    pub fn list_logs(&self) -> Vec<ActivityLog> {
        let mut logs: Vec<ActivityLog> = self.logs.iter().map(|r| r.value().clone()).collect();
        logs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        logs
    }

    pub fn get_log(&self, id: &str) -> Option<ActivityLog> {
        self.logs.get(id).map(|r| r.value().clone())
    }

    pub async fn insert_log(&self, log: ActivityLog) -> Result<InsertOutcome> {
        match self.logs.entry(log.id.clone()) {
            Entry::Occupied(_) => return Ok(InsertOutcome::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(log.clone());
            }
        }

        if let Some(db) = self.db.as_ref() {
            if let Err(e) = persistence::logs::upsert_log(db.pool(), &log).await {
                self.logs.remove(&log.id);
                return Err(e);
            }
        }

        self.publish(ChangeEvent::Insert { record: log });
        Ok(InsertOutcome::Inserted)
    }

    /// Apply `patch` to the log with `id`. Returns `None` if it does not exist.
    pub async fn update_log(&self, id: &str, patch: &LogPatch) -> Result<Option<ActivityLog>> {
        let (previous, updated) = match self.logs.get_mut(id) {
            Some(mut entry) => {
                let previous = entry.clone();
                entry.apply(patch);
                (previous, entry.clone())
            }
            None => return Ok(None),
        };

        if let Some(db) = self.db.as_ref() {
            if let Err(e) = persistence::logs::upsert_log(db.pool(), &updated).await {
                if let Some(mut entry) = self.logs.get_mut(id) {
                    *entry = previous;
                }
                return Err(e);
            }
        }

        self.publish(ChangeEvent::Update { record: updated.clone() });
        Ok(Some(updated))
    }

    /// Remove the log with `id`. Returns whether it existed.
    pub async fn remove_log(&self, id: &str) -> Result<bool> {
        let Some((_, removed)) = self.logs.remove(id) else {
            return Ok(false);
        };

        if let Some(db) = self.db.as_ref() {
            if let Err(e) = persistence::logs::delete_log(db.pool(), id).await {
                self.logs.insert(removed.id.clone(), removed);
                return Err(e);
            }
        }

        self.publish(ChangeEvent::Delete { id: id.to_string() });
        Ok(true)
    }
}
