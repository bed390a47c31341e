//! Page corpus stored in SQLite

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::store::{
    DocumentStore, Result, StoredDocument, UpsertOutcome, FRONTMATTER_DELIMITER,
    MARKDOWN_CONTENT_TYPE,
};

#[derive(sqlx::FromRow)]
struct PageRow {
    id: i64,
    path: String,
    content: String,
}

/// Document store backed by the `pages` table
///
/// Candidates are returned in ascending `id` order so that duplicate block
/// ids always resolve to the same page.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn fetch_candidates(&self) -> Result<Vec<StoredDocument>> {
        let pattern = format!("%{}%", FRONTMATTER_DELIMITER);
        let rows = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT id, path, content
            FROM pages
            WHERE content_type = ? AND content LIKE ?
            ORDER BY id ASC
            "#,
        )
        .bind(MARKDOWN_CONTENT_TYPE)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StoredDocument {
                id: row.id,
                path: row.path,
                content: row.content,
            })
            .collect())
    }

    async fn upsert(&self, path: &str, content_type: &str, content: &str) -> Result<UpsertOutcome> {
        let now = Utc::now().to_rfc3339();

        let updated = sqlx::query(
            r#"
            UPDATE pages
            SET content_type = ?, content = ?, updated_at = ?
            WHERE path = ?
            "#,
        )
        .bind(content_type)
        .bind(content)
        .bind(&now)
        .bind(path)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() > 0 {
            return Ok(UpsertOutcome::Updated);
        }

        sqlx::query(
            r#"
            INSERT INTO pages (path, content_type, content, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(path)
        .bind(content_type)
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(UpsertOutcome::Created)
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pages WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    #[tokio::test]
    async fn test_candidates_filter_and_order() {
        let store = SqliteDocumentStore::new(memory_pool().await);
        store.upsert("b", "markdown", "---\nsecond").await.unwrap();
        store.upsert("a", "markdown", "no delimiter").await.unwrap();
        store.upsert("c", "html", "---").await.unwrap();
        store.upsert("d", "markdown", "x --- y").await.unwrap();

        let docs = store.fetch_candidates().await.unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["b", "d"]);
    }

    #[tokio::test]
    async fn test_upsert_keeps_position() {
        let store = SqliteDocumentStore::new(memory_pool().await);
        assert_eq!(store.upsert("a", "markdown", "---1").await.unwrap(), UpsertOutcome::Created);
        store.upsert("b", "markdown", "---2").await.unwrap();
        assert_eq!(store.upsert("a", "markdown", "---3").await.unwrap(), UpsertOutcome::Updated);

        let docs = store.fetch_candidates().await.unwrap();
        assert_eq!(docs[0].path, "a");
        assert_eq!(docs[0].content, "---3");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SqliteDocumentStore::new(memory_pool().await);
        store.upsert("a", "markdown", "---").await.unwrap();

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.fetch_candidates().await.unwrap().is_empty());
    }
}
