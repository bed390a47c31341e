//! Body format parsers
//!
//! One strategy per [`Language`]. The API path and the render path disagree
//! on what a `text` body becomes, so callers choose an [`OutputShape`].

use serde_json::{Map, Value};

use super::error::Result;
use super::types::{mime, Language};

/// Shape requested for `text` bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// `text` stays a single trimmed string (API and cache path)
    Value,
    /// `text` becomes one `{"text": line}` record per line (render path)
    Records,
}

/// Parse a block body into data
///
/// Only `json` can fail; delimited formats are best-effort.
pub fn parse_body(body: &str, language: Language, shape: OutputShape) -> Result<Value> {
    let trimmed = body.trim();
    let data = match language {
        Language::Json => serde_json::from_str(trimmed)?,
        Language::Csv => Value::Array(parse_delimited(trimmed, ',')),
        Language::Tsv => Value::Array(parse_delimited(trimmed, '\t')),
        Language::Text => match shape {
            OutputShape::Value => Value::String(trimmed.to_string()),
            OutputShape::Records => Value::Array(
                trimmed
                    .split('\n')
                    .map(|line| {
                        let mut record = Map::new();
                        record.insert("text".to_string(), Value::String(line.to_string()));
                        Value::Object(record)
                    })
                    .collect(),
            ),
        },
    };
    Ok(data)
}

/// MIME type describing the parsed data of a language
pub fn data_content_type(language: Language) -> &'static str {
    match language {
        Language::Json => mime::JSON,
        Language::Csv => mime::CSV,
        Language::Tsv => mime::TSV,
        Language::Text => mime::TEXT,
    }
}

/// Map delimited rows onto objects keyed by the header row
///
/// Short rows are padded with empty strings, extra cells are ignored.
pub fn parse_delimited(text: &str, delimiter: char) -> Vec<Value> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines = text.split('\n');
    let headers: Vec<&str> = match lines.next() {
        Some(header) => header.split(delimiter).map(str::trim).collect(),
        None => return Vec::new(),
    };

    lines
        .map(|line| {
            let values: Vec<&str> = line.split(delimiter).collect();
            let mut row = Map::new();
            for (i, header) in headers.iter().enumerate() {
                let value = values.get(i).map_or("", |v| v.trim());
                row.insert(header.to_string(), Value::String(value.to_string()));
            }
            Value::Object(row)
        })
        .collect()
}
