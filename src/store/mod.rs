//! Document store abstraction
//!
//! The corpus of markdown pages that blocks are resolved against. The
//! SQLite implementation lives in [`crate::db`]; [`MemoryDocumentStore`]
//! serves tests and embedders that already hold their pages in memory.

mod memory;

pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use thiserror::Error;

/// Content type of pages that may contain data blocks
pub const MARKDOWN_CONTENT_TYPE: &str = "markdown";

/// Substring every candidate page must contain (frontmatter delimiter)
pub const FRONTMATTER_DELIMITER: &str = "---";

/// A page returned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: i64,
    pub path: String,
    pub content: String,
}

/// Result of writing a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Source of pages for block lookup
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Markdown pages containing a frontmatter delimiter, in a stable order
    async fn fetch_candidates(&self) -> Result<Vec<StoredDocument>>;

    /// Create or replace the page at `path`
    async fn upsert(&self, path: &str, content_type: &str, content: &str) -> Result<UpsertOutcome>;

    /// Delete the page at `path`; returns whether a page was removed
    async fn delete(&self, path: &str) -> Result<bool>;
}

/// Whether a page passes the cheap candidate pre-filter
pub fn is_candidate(content_type: &str, content: &str) -> bool {
    content_type == MARKDOWN_CONTENT_TYPE && content.contains(FRONTMATTER_DELIMITER)
}
