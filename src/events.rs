//! Document mutation events
//!
//! Page writes publish a [`DocumentEvent`]; the cache invalidator clears the
//! entire [`BlockCache`] on every event.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::cache::BlockCache;

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 256;

/// A change to the page corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    Created { path: String },
    Updated { path: String },
    Deleted { path: String },
}

impl DocumentEvent {
    /// Path of the affected page
    pub fn path(&self) -> &str {
        match self {
            Self::Created { path } | Self::Updated { path } | Self::Deleted { path } => path,
        }
    }
}

/// Broadcast channel for document events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DocumentEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event; returns the number of subscribers that will see it
    pub fn publish(&self, event: DocumentEvent) -> usize {
        tracing::debug!(page = %event.path(), "Publishing {:?}", event);
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.sender.subscribe()
    }
}

/// Clear `cache` whenever a document event arrives
///
/// A lagging receiver also clears the cache, since it has missed events.
/// The task ends when every sender is dropped.
pub fn spawn_cache_invalidator(
    cache: BlockCache,
    mut events: broadcast::Receiver<DocumentEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    cache.clear();
                    tracing::debug!(page = %event.path(), "Block cache cleared");
                }
                Err(RecvError::Lagged(missed)) => {
                    cache.clear();
                    tracing::warn!("Cache invalidator lagged by {} events, cache cleared", missed);
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("Document event channel closed, invalidator stopping");
                    break;
                }
            }
        }
    })
}
