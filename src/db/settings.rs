//! Renderer settings stored in SQLite

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::settings::{RenderSettings, SettingsSource};
use crate::store::Result;

/// Row key of the data block renderer
pub const SETTINGS_KEY: &str = "htmlDataGremlin";

/// Settings repository
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Raw JSON config for the renderer, if a row exists
    pub async fn load(&self) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT config FROM renderers WHERE key = ?")
            .bind(SETTINGS_KEY)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|(config,)| config))
    }

    /// Replace the renderer config
    pub async fn save(&self, config: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO renderers (key, config) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET config = excluded.config
            "#,
        )
        .bind(SETTINGS_KEY)
        .bind(config)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

/// Settings source reading the `renderers` table on every call
#[derive(Clone)]
pub struct SqliteSettingsSource {
    pool: SqlitePool,
}

impl SqliteSettingsSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsSource for SqliteSettingsSource {
    async fn render_settings(&self) -> RenderSettings {
        match SettingsRepository::new(&self.pool).load().await {
            Ok(Some(config)) => RenderSettings::from_json_str(&config),
            Ok(None) => RenderSettings::default(),
            Err(e) => {
                tracing::warn!("Failed to load renderer settings, using defaults: {}", e);
                RenderSettings::default()
            }
        }
    }
}
