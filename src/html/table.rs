//! Table rendering for parsed block data
//!
//! The default renderer picks a layout from the data shape:
//!
//! | data                         | layout                          |
//! |------------------------------|---------------------------------|
//! | array whose first element is an object or array | one row per element |
//! | object                       | key / value rows                |
//! | array of anything else       | single `Value` column           |
//! | scalar or empty array        | one cell with the JSON text     |
//!
//! Row columns come from the first element only (its keys, or its indices
//! when it is an array); keys that appear only in later rows are not
//! rendered.

use serde_json::{Number, Value};

use super::sandbox::LuaSandbox;
use crate::settings::RenderSettings;

/// Escape a data value for insertion into HTML
///
/// `null` renders as an empty cell.
pub fn escape_value(value: &Value) -> String {
    escape_str(&display_value(value))
}

/// Escape text for HTML content or a quoted attribute
pub fn escape_str(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// String form of a value as shown in a cell
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
    }
}

/// Numbers print without a trailing `.0` when they are whole
fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => format_float(f),
        _ => n.to_string(),
    }
}

pub(super) fn format_float(f: f64) -> String {
    if f == 0.0 {
        "0".to_string()
    } else if f.is_finite() && f.fract() == 0.0 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

/// Column keys of the first row, when the data is an array of rows
fn row_columns(data: &Value) -> Option<Vec<String>> {
    match data.as_array()?.first()? {
        Value::Object(first) => Some(first.keys().cloned().collect()),
        Value::Array(first) => Some((0..first.len()).map(|i| i.to_string()).collect()),
        _ => None,
    }
}

/// A row's value for a column key; array rows are indexed by position
fn cell<'a>(row: &'a Value, key: &str) -> Option<&'a Value> {
    match row {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Column names as seen by renderers
pub fn columns(data: &Value) -> Vec<String> {
    if let Some(columns) = row_columns(data) {
        return columns;
    }
    if data.is_object() {
        return vec!["Key".to_string(), "Value".to_string()];
    }
    vec!["Value".to_string()]
}

/// Render `data` with the built-in shape-driven layouts
pub fn render_default(data: &Value) -> String {
    if let Some(columns) = row_columns(data) {
        let rows = data.as_array().map(Vec::as_slice).unwrap_or_default();
        return render_rows(&columns, rows);
    }

    match data {
        Value::Object(map) => {
            let mut lines = vec![
                "<thead><tr><th>Key</th><th>Value</th></tr></thead>".to_string(),
                "<tbody>".to_string(),
            ];
            lines.extend(map.iter().map(|(key, value)| {
                format!(
                    "  <tr><th>{}</th><td>{}</td></tr>",
                    escape_str(key),
                    escape_value(value)
                )
            }));
            lines.push("</tbody>".to_string());
            lines.join("\n")
        }
        Value::Array(items) if !items.is_empty() => {
            let mut lines = vec![
                "<thead><tr><th>Value</th></tr></thead>".to_string(),
                "<tbody>".to_string(),
            ];
            lines.extend(
                items
                    .iter()
                    .map(|value| format!("  <tr><td>{}</td></tr>", escape_value(value))),
            );
            lines.push("</tbody>".to_string());
            lines.join("\n")
        }
        Value::Number(n) => format!(
            "<tbody><tr><td>{}</td></tr></tbody>",
            escape_str(&format_number(n))
        ),
        other => format!(
            "<tbody><tr><td>{}</td></tr></tbody>",
            escape_str(&other.to_string())
        ),
    }
}

fn render_rows(columns: &[String], rows: &[Value]) -> String {
    let header: String = columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_str(c)))
        .collect();

    let mut lines = vec![
        format!("<thead><tr>{}</tr></thead>", header),
        "<tbody>".to_string(),
    ];
    for row in rows {
        let cells: String = columns
            .iter()
            .map(|c| {
                let value = cell(row, c).unwrap_or(&Value::Null);
                format!("<td>{}</td>", escape_value(value))
            })
            .collect();
        lines.push(format!("  <tr>{}</tr>", cells));
    }
    lines.push("</tbody>".to_string());
    lines.join("\n")
}

/// Render the table body, using a named custom renderer when configured
///
/// Custom renderer output is inserted as-is. Any renderer failure falls back
/// to [`render_default`] and is only logged.
pub fn render_table(
    data: &Value,
    renderer_name: Option<&str>,
    settings: &RenderSettings,
    sandbox: &LuaSandbox,
) -> String {
    let Some(name) = renderer_name.filter(|n| !n.is_empty()) else {
        return render_default(data);
    };

    let Some(renderer) = settings.renderer(name) else {
        tracing::warn!(renderer = %name, "Custom renderer not found, using default");
        return render_default(data);
    };

    match sandbox.render(&renderer.code, data, &columns(data)) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(renderer = %name, "Custom renderer failed: {}", e);
            render_default(data)
        }
    }
}
