//! Render route
//!
//! `POST /render` takes rendered page HTML and returns it with every data
//! block replaced by a table. Settings are loaded fresh for each call.

use axum::{extract::State, response::Html, routing::post, Router};

use crate::error::{AppError, Result};
use crate::html::render_data_blocks;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/render", post(render_page))
}

async fn render_page(State(state): State<AppState>, body: String) -> Result<Html<String>> {
    let settings = state.render_settings().await;
    let sandbox = state.sandbox().clone();

    let outcome = tokio::task::spawn_blocking(move || render_data_blocks(&body, &settings, &sandbox))
        .await
        .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::debug!(
        rendered = outcome.rendered,
        skipped = outcome.skipped,
        "Rendered data blocks"
    );
    Ok(Html(outcome.html))
}
