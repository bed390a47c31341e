//! In-memory document store

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{is_candidate, DocumentStore, Result, StoredDocument, UpsertOutcome};

#[derive(Debug, Clone)]
struct Page {
    id: i64,
    path: String,
    content_type: String,
    content: String,
}

/// Insertion-ordered page store held in memory
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    pages: RwLock<Vec<Page>>,
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(path, content)` markdown pages
    pub fn with_markdown<'a>(pages: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (path, content) in pages {
            store.insert(path, super::MARKDOWN_CONTENT_TYPE, content);
        }
        store
    }

    /// Insert or replace a page synchronously
    pub fn insert(&self, path: &str, content_type: &str, content: &str) -> UpsertOutcome {
        let mut pages = self.pages.write();
        if let Some(page) = pages.iter_mut().find(|p| p.path == path) {
            page.content_type = content_type.to_string();
            page.content = content.to_string();
            return UpsertOutcome::Updated;
        }

        let id = pages.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        pages.push(Page {
            id,
            path: path.to_string(),
            content_type: content_type.to_string(),
            content: content.to_string(),
        });
        UpsertOutcome::Created
    }

    /// Number of stored pages
    pub fn len(&self) -> usize {
        self.pages.read().len()
    }

    /// Check if the store holds no pages
    pub fn is_empty(&self) -> bool {
        self.pages.read().is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch_candidates(&self) -> Result<Vec<StoredDocument>> {
        Ok(self
            .pages
            .read()
            .iter()
            .filter(|p| is_candidate(&p.content_type, &p.content))
            .map(|p| StoredDocument {
                id: p.id,
                path: p.path.clone(),
                content: p.content.clone(),
            })
            .collect())
    }

    async fn upsert(&self, path: &str, content_type: &str, content: &str) -> Result<UpsertOutcome> {
        Ok(self.insert(path, content_type, content))
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let mut pages = self.pages.write();
        let before = pages.len();
        pages.retain(|p| p.path != path);
        Ok(pages.len() != before)
    }
}
