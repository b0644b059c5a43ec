//! Change feed: the channel through which remote changes reach the store.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use trek_core::ChangeEvent;

/// Receiving end of a change-feed subscription.
///
/// Dropping the feed ends the subscription and stops its reader task.
pub struct ChangeFeed {
    rx: mpsc::Receiver<ChangeEvent>,
    reader: Option<JoinHandle<()>>,
}

impl ChangeFeed {
    /// Create a feed and the sender that publishes into it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<ChangeEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx, reader: None })
    }

    /// Tie a background reader task to the feed's lifetime.
    pub fn with_reader(mut self, reader: JoinHandle<()>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Next queued event, without waiting.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event; `None` once the publisher is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_delivers_in_order() {
        let (tx, mut feed) = ChangeFeed::channel(4);
        tx.send(ChangeEvent::Delete { id: "a".into() }).await.unwrap();
        tx.send(ChangeEvent::Delete { id: "b".into() }).await.unwrap();

        assert_eq!(feed.try_next().map(|e| e.record_id().to_string()), Some("a".into()));
        assert_eq!(feed.next().await.map(|e| e.record_id().to_string()), Some("b".into()));
        assert!(feed.try_next().is_none());

        drop(tx);
        assert!(feed.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_stops_reader() {
        let (_tx, feed) = ChangeFeed::channel(1);
        let (alive_tx, alive_rx) = tokio::sync::oneshot::channel::<()>();
        let reader = tokio::spawn(async move {
            let _alive = alive_tx;
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        });
        let feed = feed.with_reader(reader);

        drop(feed);
        // The sender is dropped with the aborted task
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), alive_rx).await;
        assert!(matches!(result, Ok(Err(_))));
    }
}
