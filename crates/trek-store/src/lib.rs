//! Trek store - activity log persistence
//!
//! Keeps the team's activity logs in memory, syncs them with a remote log
//! board when one is reachable and falls back to a local snapshot otherwise.

pub mod config;
pub mod feed;
pub mod remote;
pub mod snapshot;
pub mod store;

pub use config::StoreConfig;
pub use feed::ChangeFeed;
pub use remote::{HttpRemoteStore, RemoteLogStore};
pub use snapshot::{MemorySnapshotStore, SnapshotStore, SqliteSnapshotStore, SNAPSHOT_KEY};
pub use store::{LogStore, Phase};

/// Store wired to the HTTP log board and a SQLite snapshot.
pub type HttpLogStore = LogStore<HttpRemoteStore, SqliteSnapshotStore>;

/// Build and open a store from configuration.
pub async fn connect(config: &StoreConfig) -> anyhow::Result<HttpLogStore> {
    let remote = match HttpRemoteStore::from_config(config) {
        Ok(remote) => remote,
        Err(e) => {
            tracing::warn!("Remote store misconfigured, running local-only: {:#}", e);
            None
        }
    };
    let local = SqliteSnapshotStore::open(&config.snapshot_path).await?;

    let mut store = LogStore::new(remote, local);
    store.open().await;
    Ok(store)
}
