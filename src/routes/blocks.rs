//! Block API route
//!
//! `GET <apiRoute>` answers with the block's data as JSON, as plain text for
//! text blocks, or with the raw body when the `raw` query flag is present.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::block::mime;
use crate::error::{AppError, Result};
use crate::lookup::BlockResolver;
use crate::state::AppState;

/// A block request after extraction
#[derive(Debug, Clone)]
pub struct BlockRequest {
    pub id: String,
    pub raw: bool,
}

/// What the block endpoint sends back
#[derive(Debug, Clone, PartialEq)]
pub enum BlockResponse {
    Raw { content_type: String, body: String },
    Text(String),
    Json(Value),
}

impl IntoResponse for BlockResponse {
    fn into_response(self) -> Response {
        match self {
            BlockResponse::Raw { content_type, body } => {
                ([(header::CONTENT_TYPE, content_type)], body).into_response()
            }
            BlockResponse::Text(text) => {
                ([(header::CONTENT_TYPE, mime::TEXT.to_string())], text).into_response()
            }
            BlockResponse::Json(data) => Json(data).into_response(),
        }
    }
}

/// Create the block router for `route` (must contain an `:id` segment)
pub fn router(route: &str) -> Router<AppState> {
    Router::new().route(route, get(get_block))
}

async fn get_block(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<BlockResponse> {
    let request = BlockRequest {
        id: params.get("id").cloned().unwrap_or_default(),
        raw: query.contains_key("raw"),
    };
    handle_block_request(state.resolver(), &request).await
}

/// Resolve a block and choose its response form
pub async fn handle_block_request(
    resolver: &BlockResolver,
    request: &BlockRequest,
) -> Result<BlockResponse> {
    let block = resolver
        .resolve(&request.id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            id: request.id.clone(),
        })?;

    if request.raw {
        return Ok(BlockResponse::Raw {
            content_type: block.raw_content_type.clone(),
            body: block.raw.clone(),
        });
    }

    if block.content_type == mime::TEXT {
        let text = match &block.data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Ok(BlockResponse::Text(text));
    }

    Ok(BlockResponse::Json(block.data.clone()))
}
