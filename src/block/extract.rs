//! Block extraction from document source
//!
//! Scans markdown source for fenced blocks of a supported language:
//! ````text
//! ```csv
//! ---
//! id: inventory
//! ---
//! item,qty
//! ```
//! ````

use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

use super::error::Result;
use super::format::{data_content_type, parse_body, OutputShape};
use super::frontmatter::split_frontmatter;
use super::types::{Language, ParsedBlock, RawBlock};

static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(json|csv|tsv|text)\s*\n((?s:.*?))```").expect("Invalid fence regex")
});

/// Iterate over every supported fenced block, in source order
pub fn raw_blocks(content: &str) -> impl Iterator<Item = RawBlock> + '_ {
    FENCE_REGEX.captures_iter(content).filter_map(|caps| {
        let language = Language::from_name(caps.get(1)?.as_str())?;
        let (metadata, body) = split_frontmatter(caps.get(2)?.as_str());
        Some(RawBlock {
            language,
            metadata,
            body: body.to_string(),
        })
    })
}

/// Find the first block whose metadata `id` equals `id` and parse it
///
/// Parse failures of the matching block are returned to the caller rather
/// than skipped; later blocks with the same id are never considered.
pub fn extract_block(content: &str, id: &str) -> Result<Option<ParsedBlock>> {
    match raw_blocks(content).find(|block| block.id() == Some(id)) {
        Some(block) => parse_block(&block).map(Some),
        None => Ok(None),
    }
}

/// Parse a raw block for the API path
pub fn parse_block(block: &RawBlock) -> Result<ParsedBlock> {
    let data = parse_body(&block.body, block.language, OutputShape::Value)?;
    Ok(ParsedBlock {
        data,
        content_type: data_content_type(block.language).to_string(),
        raw: block.body.trim().to_string(),
        raw_content_type: block.language.raw_content_type().to_string(),
        timestamp: Utc::now(),
    })
}
