//! Store configuration from environment.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the remote log board; `None` means local-only
    pub remote_url: Option<String>,
    pub api_key: Option<String>,
    /// SQLite file holding the local snapshot
    pub snapshot_path: String,
    pub request_timeout: Duration,
    /// Change events buffered between the feed reader and the store
    pub feed_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            api_key: None,
            snapshot_path: "data/trek-local.db".to_string(),
            request_timeout: Duration::from_secs(10),
            feed_buffer: 256,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            remote_url: non_empty_var("TREK_REMOTE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key: non_empty_var("TREK_API_KEY"),
            snapshot_path: non_empty_var("TREK_SNAPSHOT_DB").unwrap_or(defaults.snapshot_path),
            request_timeout: env::var("TREK_REQUEST_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            feed_buffer: env::var("TREK_FEED_BUFFER")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.feed_buffer),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
