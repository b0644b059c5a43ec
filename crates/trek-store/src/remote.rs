//! Remote list store: the trait the log store syncs against, and its HTTP client.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::connect_async;
use trek_core::{ActivityLog, ChangeEvent, LogPatch};

use crate::config::StoreConfig;
use crate::feed::ChangeFeed;

/// Hosted list of activity logs.
#[allow(async_fn_in_trait)]
pub trait RemoteLogStore {
    /// All records, ordered by timestamp ascending.
    async fn fetch_all(&self) -> Result<Vec<ActivityLog>>;

    async fn insert(&self, log: &ActivityLog) -> Result<()>;

    /// Field-level update of the record with `id`.
    async fn update(&self, id: &str, patch: &LogPatch) -> Result<()>;

    /// Delete by id. Deleting a record that does not exist is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Subscribe to insert/update/delete notifications.
    async fn subscribe(&self) -> Result<ChangeFeed>;
}

/// Client for a trek log board server.
pub struct HttpRemoteStore {
    base_url: String,
    api_key: Option<String>,
    feed_buffer: usize,
    client: reqwest::Client,
}

impl HttpRemoteStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            feed_buffer: 256,
            client,
        })
    }

    /// Build a client from configuration; `None` if no remote is configured.
    pub fn from_config(config: &StoreConfig) -> Result<Option<Self>> {
        let Some(url) = config.remote_url.as_deref() else {
            return Ok(None);
        };
        let mut store = Self::new(url, config.api_key.clone(), config.request_timeout)?;
        store.feed_buffer = config.feed_buffer;
        Ok(Some(store))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key.as_deref() {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    fn log_url(&self, id: &str) -> String {
        format!("{}/v1/logs/{}", self.base_url, id)
    }
}

impl RemoteLogStore for HttpRemoteStore {
    async fn fetch_all(&self) -> Result<Vec<ActivityLog>> {
        let url = format!("{}/v1/logs", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch logs: {}", response.status());
        }

        let mut logs: Vec<ActivityLog> = response
            .json()
            .await
            .context("malformed log list from remote")?;
        // Stable: keeps server order among equal timestamps
        logs.sort_by_key(|log| log.timestamp);
        Ok(logs)
    }

    async fn insert(&self, log: &ActivityLog) -> Result<()> {
        let url = format!("{}/v1/logs", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(log)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to insert log {}: {}", log.id, response.status());
        }
        Ok(())
    }

    async fn update(&self, id: &str, patch: &LogPatch) -> Result<()> {
        let response = self
            .authorize(self.client.patch(self.log_url(id)))
            .json(patch)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to update log {}: {}", id, response.status());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .authorize(self.client.delete(self.log_url(id)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            anyhow::bail!("Failed to delete log {}: {}", id, status);
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<ChangeFeed> {
        let url = build_ws_url(&self.base_url, "/v1/logs/feed")?;
        let mut request = url.as_str().into_client_request()?;
        if let Some(key) = self.api_key.as_deref() {
            request.headers_mut().insert(
                "Authorization",
                HeaderValue::from_str(&format!("Bearer {}", key))?,
            );
        }

        let (socket, _) = connect_async(request)
            .await
            .context("failed to connect change feed")?;
        tracing::info!("Subscribed to change feed at {}", url);

        let (tx, feed) = ChangeFeed::channel(self.feed_buffer);
        let reader = tokio::spawn(forward_events(socket, tx));
        Ok(feed.with_reader(reader))
    }
}

async fn forward_events<S>(mut socket: S, tx: mpsc::Sender<ChangeEvent>)
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Unpin,
{
    while let Some(msg) = socket.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => text,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Change feed error: {}", e);
                break;
            }
        };

        match serde_json::from_str::<ChangeEvent>(&text) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    // Store dropped the subscription
                    break;
                }
            }
            Err(e) => tracing::warn!("Ignoring malformed change event: {}", e),
        }
    }
    tracing::debug!("Change feed reader stopped");
}

fn build_ws_url(base: &str, path: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => other,
    }
    .to_string();

    url.set_scheme(&scheme)
        .map_err(|_| anyhow::anyhow!("Invalid base URL scheme"))?;
    url.set_path(path);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_from_http_base() {
        let url = build_ws_url("http://localhost:3000", "/v1/logs/feed").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:3000/v1/logs/feed");

        let url = build_ws_url("https://board.example.com/", "/v1/logs/feed").unwrap();
        assert_eq!(url.as_str(), "wss://board.example.com/v1/logs/feed");
    }

    #[test]
    fn test_unconfigured_remote() {
        let config = StoreConfig::default();
        assert!(HttpRemoteStore::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let store =
            HttpRemoteStore::new("http://localhost:3000/", Some("  ".into()), Duration::from_secs(1))
                .unwrap();
        assert!(store.api_key.is_none());
        assert_eq!(store.base_url(), "http://localhost:3000");
    }
}
