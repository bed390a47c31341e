//! Block cache with time-to-live expiry
//!
//! Maps block id to its parsed block. Entries expire lazily: an entry read
//! at or after its TTL is evicted and reported as a miss. There is no
//! background sweep. Any document mutation clears the whole cache (see
//! [`crate::events`]).
//!
//! # Thread Safety
//!
//! The map sits behind a `parking_lot::Mutex`. No operation holds the lock
//! across an await point, so concurrent misses for the same id may both
//! store a value; the last write wins.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;

use crate::block::ParsedBlock;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

struct CacheEntry {
    block: Arc<ParsedBlock>,
    stored_at: Instant,
}

/// Shared block cache handle
#[derive(Clone)]
pub struct BlockCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl Default for BlockCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl BlockCache {
    /// Create an empty cache with the given entry lifetime
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Entry lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live entry
    pub fn get(&self, id: &str) -> Option<Arc<ParsedBlock>> {
        self.get_at(id, Instant::now())
    }

    /// Get an entry as seen at `now`, evicting it if it has expired
    pub fn get_at(&self, id: &str, now: Instant) -> Option<Arc<ParsedBlock>> {
        let mut entries = self.entries.lock();
        let entry = entries.get(id)?;

        if now.saturating_duration_since(entry.stored_at) < self.ttl {
            return Some(Arc::clone(&entry.block));
        }

        entries.remove(id);
        tracing::debug!(block_id = %id, "Evicted expired cache entry");
        None
    }

    /// Store a block, stamping it with the current time
    pub fn set(&self, id: &str, block: ParsedBlock) -> Arc<ParsedBlock> {
        self.set_at(id, block, Instant::now())
    }

    /// Store a block as of `now`, replacing any previous entry
    pub fn set_at(&self, id: &str, mut block: ParsedBlock, now: Instant) -> Arc<ParsedBlock> {
        block.timestamp = Utc::now();
        let block = Arc::new(block);
        self.entries.lock().insert(
            id.to_string(),
            CacheEntry {
                block: Arc::clone(&block),
                stored_at: now,
            },
        );
        block
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
