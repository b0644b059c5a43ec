//! The log store: owner of the canonical activity log collection.
//!
//! Mutations are applied to the in-memory collection first and then written
//! to whichever backing store is active. Remote failures are never reverted;
//! the in-memory collection stays authoritative for display until the next
//! full reload (last write observed wins).

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use trek_core::{ActivityLog, ChangeEvent, LogPatch, Progress, Route};

use crate::feed::ChangeFeed;
use crate::remote::RemoteLogStore;
use crate::snapshot::{SnapshotStore, SNAPSHOT_KEY};

/// Persistence phase of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Initial load has not finished
    Loading,
    /// Loaded from the remote; writes go to the remote
    RemoteSynced,
    /// Remote unavailable; writes go to the local snapshot
    LocalOnly,
}

pub struct LogStore<R, L> {
    phase: Phase,
    logs: Vec<ActivityLog>,
    remote: Option<R>,
    local: L,
    feed: Option<ChangeFeed>,
}

impl<R: RemoteLogStore, L: SnapshotStore> LogStore<R, L> {
    /// Create a store in the `Loading` phase. `remote` is `None` when no
    /// remote list store is configured.
    pub fn new(remote: Option<R>, local: L) -> Self {
        Self {
            phase: Phase::Loading,
            logs: Vec::new(),
            remote,
            local,
            feed: None,
        }
    }

    /// Load the collection and, when synced with the remote, subscribe to
    /// its change feed.
    pub async fn open(&mut self) -> Phase {
        self.feed = None;
        self.phase = Phase::Loading;

        let Some(remote) = self.remote.as_ref() else {
            info!("No remote store configured, using local snapshot");
            self.load_local().await;
            return self.phase;
        };

        match remote.fetch_all().await {
            Ok(logs) => {
                info!("Loaded {} logs from remote", logs.len());
                self.logs = logs;
                self.phase = Phase::RemoteSynced;

                match remote.subscribe().await {
                    Ok(feed) => self.feed = Some(feed),
                    Err(e) => warn!("Change feed unavailable, continuing without live updates: {:#}", e),
                }
            }
            Err(e) => {
                warn!("Remote fetch failed, falling back to local: {:#}", e);
                self.load_local().await;
            }
        }
        self.phase
    }

    /// End the change-feed subscription.
    pub fn close(&mut self) {
        if self.feed.take().is_some() {
            info!("Change feed closed");
        }
    }

    async fn load_local(&mut self) {
        self.logs = match self.local.load(SNAPSHOT_KEY).await {
            Ok(Some(logs)) => logs,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Local snapshot unreadable, starting empty: {:#}", e);
                Vec::new()
            }
        };
        self.phase = Phase::LocalOnly;
        info!("Loaded {} logs from local snapshot", self.logs.len());
    }

    async fn save_local(&self) {
        if let Err(e) = self.local.save(SNAPSHOT_KEY, &self.logs).await {
            error!("Failed to write local snapshot: {:#}", e);
        }
    }

    /// Remote to write to, only while synced with it.
    fn synced_remote(&self) -> Option<&R> {
        match self.phase {
            Phase::RemoteSynced => self.remote.as_ref(),
            Phase::Loading | Phase::LocalOnly => None,
        }
    }

    /// Record `steps` for `member_id` at `date`.
    ///
    /// If the remote rejects the insert, the record is kept in the local
    /// snapshot instead and is not retried remotely.
    pub async fn add_log(
        &mut self,
        member_id: impl Into<String>,
        steps: u64,
        date: DateTime<Utc>,
    ) -> ActivityLog {
        let log = ActivityLog::new(member_id, steps, date);
        self.upsert(log.clone());

        match self.synced_remote() {
            Some(remote) => {
                if let Err(e) = remote.insert(&log).await {
                    error!("Remote insert failed, keeping log {} locally: {:#}", log.id, e);
                    self.save_local().await;
                }
            }
            None => self.save_local().await,
        }
        log
    }

    /// Replace the stored fields of `updated`. Returns whether the record
    /// was present in memory.
    pub async fn update_log(&mut self, updated: ActivityLog) -> bool {
        let found = match self.logs.iter_mut().find(|l| l.id == updated.id) {
            Some(existing) => {
                *existing = updated.clone();
                true
            }
            None => false,
        };

        match self.synced_remote() {
            Some(remote) => {
                if let Err(e) = remote.update(&updated.id, &LogPatch::from_log(&updated)).await {
                    error!("Remote update of log {} failed: {:#}", updated.id, e);
                }
            }
            None => self.save_local().await,
        }
        found
    }

    /// Remove the record with `id`. Unknown ids are a no-op; returns whether
    /// a record was removed.
    pub async fn delete_log(&mut self, id: &str) -> bool {
        let before = self.logs.len();
        self.logs.retain(|l| l.id != id);
        let removed = self.logs.len() != before;

        match self.synced_remote() {
            Some(remote) => {
                if let Err(e) = remote.delete(id).await {
                    error!("Remote delete of log {} failed: {:#}", id, e);
                }
            }
            None => self.save_local().await,
        }
        removed
    }

    /// Apply a change pushed by the remote.
    pub fn apply_change(&mut self, event: ChangeEvent) {
        debug!("Applying change event for {}", event.record_id());
        match event {
            ChangeEvent::Insert { record } => self.upsert(record),
            ChangeEvent::Update { record } => {
                if let Some(existing) = self.logs.iter_mut().find(|l| l.id == record.id) {
                    *existing = record;
                }
            }
            ChangeEvent::Delete { id } => self.logs.retain(|l| l.id != id),
        }
    }

    /// Apply every change already queued on the feed. Returns how many were
    /// applied.
    pub fn poll_changes(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.feed.as_mut().and_then(ChangeFeed::try_next) {
            self.apply_change(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next change and apply it. Returns `None` when there is
    /// no subscription or the feed has ended.
    pub async fn next_change(&mut self) -> Option<ChangeEvent> {
        let event = self.feed.as_mut()?.next().await;
        match event {
            Some(event) => {
                self.apply_change(event.clone());
                Some(event)
            }
            None => {
                warn!("Change feed ended");
                self.feed = None;
                None
            }
        }
    }

    fn upsert(&mut self, log: ActivityLog) {
        match self.logs.iter_mut().find(|l| l.id == log.id) {
            Some(existing) => *existing = log,
            None => self.logs.push(log),
        }
    }

    pub fn remote(&self) -> Option<&R> {
        self.remote.as_ref()
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_online(&self) -> bool {
        self.phase == Phase::RemoteSynced
    }

    pub fn is_subscribed(&self) -> bool {
        self.feed.is_some()
    }

    pub fn logs(&self) -> &[ActivityLog] {
        &self.logs
    }

    pub fn get(&self, id: &str) -> Option<&ActivityLog> {
        self.logs.iter().find(|l| l.id == id)
    }

    pub fn total_steps(&self) -> u64 {
        trek_core::total_steps(&self.logs)
    }

    pub fn elevation(&self) -> u64 {
        trek_core::elevation_for_steps(self.total_steps())
    }

    pub fn progress<'a>(&self, route: &'a Route) -> Progress<'a> {
        Progress::from_logs(&self.logs, route)
    }

    pub fn logs_for_day<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<&ActivityLog> {
        trek_core::logs_for_day(&self.logs, day, tz)
    }
}
