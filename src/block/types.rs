//! Core block types
//!
//! Language tags, metadata and the parsed block value shared by the API
//! and render paths.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata parsed from a block's frontmatter header
pub type Metadata = HashMap<String, String>;

/// Block body language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Json,
    Csv,
    Tsv,
    Text,
}

impl Language {
    /// All supported languages, in detection order
    pub const ALL: [Language; 4] = [Language::Json, Language::Csv, Language::Tsv, Language::Text];

    /// Fence tag / class suffix for this language
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Text => "text",
        }
    }

    /// Parse a fence tag
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.as_str() == name)
    }

    /// Detect the language from a `class` attribute such as `language-csv`
    ///
    /// Only whole class tokens count, so `language-jsonc` is not json. When
    /// several tokens match, the order of [`Language::ALL`] decides.
    pub fn from_class(class: &str) -> Option<Self> {
        let names: Vec<&str> = class
            .split_whitespace()
            .filter_map(|token| token.strip_prefix("language-"))
            .collect();
        Self::ALL
            .into_iter()
            .find(|lang| names.contains(&lang.as_str()))
    }

    /// MIME type of the raw block body
    pub fn raw_content_type(&self) -> &'static str {
        match self {
            Self::Json => mime::JSON,
            Self::Csv => mime::CSV,
            Self::Tsv => mime::TSV,
            Self::Text => mime::TEXT,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MIME type for a fence tag; unknown tags are served as plain text
pub fn raw_content_type(name: &str) -> &'static str {
    Language::from_name(name)
        .map(|lang| lang.raw_content_type())
        .unwrap_or(mime::TEXT)
}

/// MIME types used for block responses
pub mod mime {
    pub const JSON: &str = "application/json";
    pub const CSV: &str = "text/csv";
    pub const TSV: &str = "text/tab-separated-values";
    pub const TEXT: &str = "text/plain";
}

/// A fenced block as found in a document, before body parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub language: Language,
    pub metadata: Metadata,
    pub body: String,
}

impl RawBlock {
    /// The block identifier, if the frontmatter declares one
    pub fn id(&self) -> Option<&str> {
        self.metadata.get("id").map(String::as_str)
    }
}

/// A block whose body has been parsed into typed data
///
/// This is the cache value and the payload behind every API response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBlock {
    /// Parsed body (object, array or string)
    pub data: Value,
    /// MIME type describing `data`
    pub content_type: String,
    /// Trimmed original body
    pub raw: String,
    /// MIME type of `raw`
    pub raw_content_type: String,
    /// When the block was parsed or last stored in the cache
    pub timestamp: DateTime<Utc>,
}
