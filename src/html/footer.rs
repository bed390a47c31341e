//! Table footer with API links

use crate::block::Language;

use super::table::escape_str;

const LINK_ATTRS: &str =
    r#"target="_blank" rel="noopener" class="is-external-link" style="color: #1976d2 !important;""#;

/// Inputs of the footer row
#[derive(Debug, Clone, Copy)]
pub struct FooterContext<'a> {
    pub id: &'a str,
    pub language: Language,
    pub column_count: usize,
    /// Route template containing an `:id` placeholder
    pub api_route: &'a str,
    pub table_class: &'a str,
}

/// Replace the `:id` placeholder with the HTML-escaped id
pub fn interpolate_route(api_route: &str, id: &str) -> String {
    api_route.replacen(":id", &escape_str(id), 1)
}

/// Build the `<tfoot>` linking to the block's JSON form, plus its raw form
/// for non-JSON blocks
pub fn build_footer(ctx: &FooterContext<'_>) -> String {
    let href = interpolate_route(ctx.api_route, ctx.id);
    let json_link = format!(r#"<a href="{}" {}>JSON</a>"#, href, LINK_ATTRS);
    let raw_link = if ctx.language != Language::Json {
        format!(r#" · <a href="{}?raw" {}>Raw</a>"#, href, LINK_ATTRS)
    } else {
        String::new()
    };

    [
        "<tfoot>".to_string(),
        format!(
            r#"  <tr><td colspan="{}" class="{}-api-link">"#,
            ctx.column_count,
            escape_str(ctx.table_class)
        ),
        format!("    API: {}{}", json_link, raw_link),
        "  </td></tr>".to_string(),
        "</tfoot>".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(language: Language) -> FooterContext<'static> {
        FooterContext {
            id: "sales",
            language,
            column_count: 3,
            api_route: "/gremlin/:id",
            table_class: "json-api-table",
        }
    }

    #[test]
    fn test_json_footer_has_single_link() {
        let html = build_footer(&ctx(Language::Json));
        assert!(html.contains(r#"<a href="/gremlin/sales" "#));
        assert!(html.contains(r#"colspan="3" class="json-api-table-api-link""#));
        assert!(!html.contains("?raw"));
    }

    #[test]
    fn test_csv_footer_has_raw_link() {
        let html = build_footer(&ctx(Language::Csv));
        assert!(html.contains(r#"<a href="/gremlin/sales?raw" "#));
        assert!(html.contains(">Raw</a>"));
    }

    #[test]
    fn test_route_interpolation_escapes() {
        assert_eq!(interpolate_route("/d/:id/view", "<x>"), "/d/&lt;x&gt;/view");
        assert_eq!(interpolate_route("/static", "x"), "/static");
    }
}
