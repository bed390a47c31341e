//! Frontmatter splitting
//!
//! A block body may start with a `---` delimited header of `key: value`
//! lines. The header becomes [`Metadata`], the rest is the body.

use regex::Regex;
use std::sync::LazyLock;

use super::types::Metadata;

static FRONTMATTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\n(.*?)\n---\n(.*)\z").expect("Invalid frontmatter regex")
});

/// Split a raw block body into its metadata and remaining body
///
/// Without a well-formed header the metadata is empty and the body is
/// returned unchanged.
pub fn split_frontmatter(raw: &str) -> (Metadata, &str) {
    let Some(caps) = FRONTMATTER_REGEX.captures(raw) else {
        return (Metadata::new(), raw);
    };

    let header = caps.get(1).map_or("", |m| m.as_str());
    let body = caps.get(2).map_or("", |m| m.as_str());

    (parse_header(header), body)
}

fn parse_header(header: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in header.split('\n') {
        match line.find(':') {
            Some(idx) if idx > 0 => {
                metadata.insert(
                    line[..idx].trim().to_string(),
                    line[idx + 1..].trim().to_string(),
                );
            }
            _ => {}
        }
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_header() {
        let raw = "---\nid: sales\nrender: chart\n---\n{\"a\":1}\n";
        let (meta, body) = split_frontmatter(raw);

        assert_eq!(meta.get("id").map(String::as_str), Some("sales"));
        assert_eq!(meta.get("render").map(String::as_str), Some("chart"));
        assert_eq!(body, "{\"a\":1}\n");
    }

    #[test]
    fn test_split_without_header() {
        let raw = "{\"a\":1}";
        let (meta, body) = split_frontmatter(raw);

        assert!(meta.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_first_colon_separates() {
        let (meta, _) = split_frontmatter("---\nurl: http://x/y\n---\nbody");
        assert_eq!(meta.get("url").map(String::as_str), Some("http://x/y"));
    }

    #[test]
    fn test_lines_without_key_are_dropped() {
        let (meta, body) = split_frontmatter("---\n: orphan\nnot a pair\n  id :  x  \n---\nrest");

        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get("id").map(String::as_str), Some("x"));
        assert_eq!(body, "rest");
    }

    #[test]
    fn test_unterminated_header_is_body() {
        let raw = "---\nid: x\nno closing delimiter";
        let (meta, body) = split_frontmatter(raw);

        assert!(meta.is_empty());
        assert_eq!(body, raw);
    }
}
