//! Database schema initialization

use sqlx::SqlitePool;

use crate::store::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Page corpus searched for data blocks
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL UNIQUE,
    content_type TEXT NOT NULL DEFAULT 'markdown',
    content TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_pages_content_type ON pages(content_type);

-- Renderer configuration (JSON document per renderer key)
CREATE TABLE IF NOT EXISTS renderers (
    key TEXT PRIMARY KEY,
    config TEXT NOT NULL DEFAULT '{}'
);
"#;
