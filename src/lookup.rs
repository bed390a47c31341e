//! Block resolution across the page corpus
//!
//! [`find_block`] scans candidate pages in store order and returns the first
//! matching block. A page whose matching block fails to parse is logged and
//! skipped; the scan continues with the next page. [`BlockResolver`] puts the
//! [`BlockCache`] in front of the scan.

use std::sync::Arc;

use crate::block::{extract_block, ParsedBlock};
use crate::cache::BlockCache;
use crate::store::{DocumentStore, Result};

/// Scan the corpus for the first block with the given id
pub async fn find_block(store: &dyn DocumentStore, id: &str) -> Result<Option<ParsedBlock>> {
    let documents = store.fetch_candidates().await?;
    tracing::debug!(block_id = %id, candidates = documents.len(), "Scanning corpus");

    for document in &documents {
        match extract_block(&document.content, id) {
            Ok(Some(block)) => {
                tracing::debug!(block_id = %id, page = %document.path, "Block found");
                return Ok(Some(block));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    block_id = %id,
                    page = %document.path,
                    "Skipping page with unusable block: {}",
                    e
                );
            }
        }
    }

    Ok(None)
}

/// Cache-fronted block lookup
#[derive(Clone)]
pub struct BlockResolver {
    store: Arc<dyn DocumentStore>,
    cache: BlockCache,
}

impl BlockResolver {
    pub fn new(store: Arc<dyn DocumentStore>, cache: BlockCache) -> Self {
        Self { store, cache }
    }

    /// Get the document store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Get the block cache
    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    /// Resolve a block id, populating the cache on a fresh hit
    pub async fn resolve(&self, id: &str) -> Result<Option<Arc<ParsedBlock>>> {
        if let Some(block) = self.cache.get(id) {
            tracing::debug!(block_id = %id, "Cache hit");
            return Ok(Some(block));
        }

        let found = find_block(self.store.as_ref(), id).await?;
        Ok(found.map(|block| self.cache.set(id, block)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use serde_json::json;

    fn json_block(id: &str, body: &str) -> String {
        format!("```json\n---\nid: {}\n---\n{}\n```\n", id, body)
    }

    #[tokio::test]
    async fn test_scan_continues_past_non_matching_pages() {
        let first = json_block("other", "{\"x\":0}");
        let second = json_block("target", "{\"x\":2}");
        let store = MemoryDocumentStore::with_markdown([("one", first.as_str()), ("two", second.as_str())]);

        let block = find_block(&store, "target").await.unwrap().unwrap();
        assert_eq!(block.data, json!({"x": 2}));
    }

    #[tokio::test]
    async fn test_scan_skips_malformed_page() {
        let broken = json_block("target", "{broken");
        let good = json_block("target", "[1,2]");
        let store = MemoryDocumentStore::with_markdown([("bad", broken.as_str()), ("good", good.as_str())]);

        let block = find_block(&store, "target").await.unwrap().unwrap();
        assert_eq!(block.data, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_first_page_wins() {
        let a = json_block("dup", "\"a\"");
        let b = json_block("dup", "\"b\"");
        let store = MemoryDocumentStore::with_markdown([("a", a.as_str()), ("b", b.as_str())]);

        let block = find_block(&store, "dup").await.unwrap().unwrap();
        assert_eq!(block.data, json!("a"));
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let store = MemoryDocumentStore::with_markdown([("a", "---\nnothing here")]);
        assert!(find_block(&store, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolver_caches_hits() {
        let doc = json_block("k", "{\"v\":1}");
        let store = Arc::new(MemoryDocumentStore::with_markdown([("p", doc.as_str())]));
        let resolver = BlockResolver::new(store.clone(), BlockCache::default());

        let first = resolver.resolve("k").await.unwrap().unwrap();
        assert_eq!(resolver.cache().len(), 1);

        // Page changes are invisible until the cache is cleared
        store.insert("p", "markdown", &json_block("k", "{\"v\":2}"));
        let cached = resolver.resolve("k").await.unwrap().unwrap();
        assert_eq!(cached.data, first.data);

        resolver.cache().clear();
        let fresh = resolver.resolve("k").await.unwrap().unwrap();
        assert_eq!(fresh.data, json!({"v": 2}));
    }

    #[tokio::test]
    async fn test_resolver_does_not_cache_misses() {
        let store = Arc::new(MemoryDocumentStore::new());
        let resolver = BlockResolver::new(store, BlockCache::default());

        assert!(resolver.resolve("none").await.unwrap().is_none());
        assert!(resolver.cache().is_empty());
    }
}
