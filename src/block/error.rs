//! Block error types

use thiserror::Error;

/// Errors raised while turning a block body into data
#[derive(Debug, Error)]
pub enum BlockError {
    /// Malformed JSON body
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for block operations
pub type Result<T> = std::result::Result<T, BlockError>;
