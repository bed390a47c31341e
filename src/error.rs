//! Error types for the Data Gremlin server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
///
/// Client errors carry detail in the body. Everything else is logged and
/// answered with a generic 500.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Block not found: {id}")]
    NotFound { id: String },

    #[error("Page not found: {path}")]
    PageNotFound { path: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound { id } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Block not found", "id": id })),
            )
                .into_response(),
            AppError::PageNotFound { path } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Page not found", "path": path })),
            )
                .into_response(),
            AppError::Internal(msg) => {
                tracing::error!("Data Gremlin API error: {}", msg);
                internal_error()
            }
            AppError::Store(e) => {
                tracing::error!("Data Gremlin API error: {}", e);
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
