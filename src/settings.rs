//! Renderer settings
//!
//! Settings are stored by the host as a JSON document. Every field is
//! optional: a missing, empty or mistyped value falls back to its default,
//! and a document that is not JSON at all yields [`RenderSettings::default`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Default route of the block endpoint
pub const DEFAULT_API_ROUTE: &str = "/gremlin/:id";
/// Default CSS class of rendered tables
pub const DEFAULT_TABLE_CLASS: &str = "json-api-table";

/// A named, user-supplied renderer (Lua source)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomRenderer {
    pub name: String,
    pub code: String,
}

/// Settings shared by the block endpoint and the render pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSettings {
    /// Mount the block endpoint at all
    pub api_enabled: bool,
    /// Endpoint route containing an `:id` placeholder
    pub api_route: String,
    pub table_class: String,
    pub show_api_link: bool,
    pub renderers: Vec<CustomRenderer>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            api_enabled: true,
            api_route: DEFAULT_API_ROUTE.to_string(),
            table_class: DEFAULT_TABLE_CLASS.to_string(),
            show_api_link: true,
            renderers: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Parse a stored settings document
    pub fn from_json_str(config: &str) -> Self {
        match serde_json::from_str::<Value>(config) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::warn!("Invalid renderer settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Read settings from a JSON value, field by field
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            api_enabled: value.get("apiEnabled") != Some(&Value::Bool(false)),
            api_route: non_empty("apiRoute").unwrap_or(defaults.api_route),
            table_class: non_empty("tableClass").unwrap_or(defaults.table_class),
            show_api_link: value.get("showApiLink") != Some(&Value::Bool(false)),
            renderers: value.get("renderers").map(parse_renderers).unwrap_or_default(),
        }
    }

    /// Find a custom renderer by exact name
    pub fn renderer(&self, name: &str) -> Option<&CustomRenderer> {
        self.renderers.iter().find(|r| r.name == name)
    }
}

/// Renderers may be stored as an array or as a string holding an array
fn parse_renderers(value: &Value) -> Vec<CustomRenderer> {
    let parsed;
    let list = match value {
        Value::String(text) if text.trim().is_empty() => return Vec::new(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(inner) => {
                parsed = inner;
                &parsed
            }
            Err(e) => {
                tracing::warn!("Failed to parse custom renderers config: {}", e);
                return Vec::new();
            }
        },
        other => other,
    };

    let Some(items) = list.as_array() else {
        tracing::warn!("Custom renderers config is not a list, ignoring");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?;
            let code = item.get("code")?.as_str()?;
            if name.is_empty() || code.is_empty() {
                return None;
            }
            Some(CustomRenderer {
                name: name.to_string(),
                code: code.to_string(),
            })
        })
        .collect()
}

/// Source of settings, read fresh on every use
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn render_settings(&self) -> RenderSettings;
}

#[async_trait]
impl SettingsSource for RenderSettings {
    async fn render_settings(&self) -> RenderSettings {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_for_empty_document() {
        assert_eq!(RenderSettings::from_value(&json!({})), RenderSettings::default());
        assert_eq!(RenderSettings::from_json_str("not json"), RenderSettings::default());
    }

    #[test]
    fn test_explicit_values() {
        let settings = RenderSettings::from_value(&json!({
            "apiEnabled": false,
            "apiRoute": "/data/:id",
            "tableClass": "grid",
            "showApiLink": false,
            "renderers": [{"name": "list", "code": "return 'x'"}]
        }));

        assert!(!settings.api_enabled);
        assert_eq!(settings.api_route, "/data/:id");
        assert_eq!(settings.table_class, "grid");
        assert!(!settings.show_api_link);
        assert_eq!(settings.renderer("list").unwrap().code, "return 'x'");
    }

    #[test]
    fn test_mistyped_fields_fall_back() {
        let settings = RenderSettings::from_value(&json!({
            "apiRoute": "",
            "tableClass": null,
            "showApiLink": "no",
            "renderers": 3
        }));

        assert_eq!(settings.api_route, DEFAULT_API_ROUTE);
        assert_eq!(settings.table_class, DEFAULT_TABLE_CLASS);
        assert!(settings.show_api_link);
        assert!(settings.renderers.is_empty());
    }

    #[test]
    fn test_renderers_as_json_string() {
        let settings = RenderSettings::from_value(&json!({
            "renderers": "[{\"name\":\"a\",\"code\":\"return ''\"},{\"name\":\"b\"}]"
        }));
        assert_eq!(settings.renderers.len(), 1);
        assert!(settings.renderer("b").is_none());

        let broken = RenderSettings::from_value(&json!({"renderers": "[{"}));
        assert!(broken.renderers.is_empty());
    }
}
