//! Page write API routes
//!
//! Every successful write publishes a [`DocumentEvent`], which clears the
//! block cache.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::put,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::events::DocumentEvent;
use crate::state::AppState;
use crate::store::{UpsertOutcome, MARKDOWN_CONTENT_TYPE};

#[derive(Debug, Serialize)]
pub struct PageWritten {
    pub path: String,
    pub created: bool,
}

/// Create the pages router
pub fn router() -> Router<AppState> {
    Router::new().route("/*path", put(put_page).delete(delete_page))
}

/// Create or replace a markdown page
async fn put_page(
    State(state): State<AppState>,
    Path(path): Path<String>,
    content: String,
) -> Result<(StatusCode, Json<PageWritten>)> {
    let outcome = state
        .store()
        .upsert(&path, MARKDOWN_CONTENT_TYPE, &content)
        .await?;

    let (status, event) = match outcome {
        UpsertOutcome::Created => (StatusCode::CREATED, DocumentEvent::Created { path: path.clone() }),
        UpsertOutcome::Updated => (StatusCode::OK, DocumentEvent::Updated { path: path.clone() }),
    };
    state.events().publish(event);

    tracing::info!(page = %path, ?outcome, "Page written");
    Ok((
        status,
        Json(PageWritten {
            path,
            created: outcome == UpsertOutcome::Created,
        }),
    ))
}

/// Delete a page
async fn delete_page(State(state): State<AppState>, Path(path): Path<String>) -> Result<StatusCode> {
    if !state.store().delete(&path).await? {
        return Err(AppError::PageNotFound { path });
    }

    state.events().publish(DocumentEvent::Deleted { path: path.clone() });
    tracing::info!(page = %path, "Page deleted");
    Ok(StatusCode::NO_CONTENT)
}
