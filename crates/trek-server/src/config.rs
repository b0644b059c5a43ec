//! Server configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,
    /// Bearer key required on `/v1/*` when set
    pub api_key: Option<String>,
    /// Change events buffered per feed subscriber
    pub feed_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("TREK_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            database_path: env::var("TREK_DATABASE_PATH")
                .unwrap_or_else(|_| "data/trek.db".to_string()),
            database_max_connections: env::var("TREK_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            api_key: env::var("TREK_API_KEY")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            feed_capacity: env::var("TREK_FEED_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(256),
        }
    }
}
