//! In-page data block rendering using lol_html
//!
//! Rendered markdown carries data blocks as
//! `<pre><code class="language-csv">---\nid: x\n---\n...</code></pre>`.
//! Each block with frontmatter and a parseable body has its `<pre>` replaced
//! by a table. Other blocks are left untouched.
//!
//! The rewrite takes two passes: the first collects the text of every
//! `pre > code` (a `<pre>` start tag is emitted before its content is
//! known), the second replaces the qualifying `<pre>` elements by position.

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::block::{parse_body, split_frontmatter, Language, OutputShape};
use crate::settings::RenderSettings;

use super::footer::{build_footer, FooterContext};
use super::sandbox::LuaSandbox;
use super::table::{columns, escape_str, render_table};

/// Errors during block rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

/// Result of a render pass
#[derive(Debug)]
pub struct RenderOutcome {
    /// The page with data blocks replaced by tables
    pub html: String,
    /// Number of blocks replaced
    pub rendered: usize,
    /// Number of supported-language blocks left untouched
    pub skipped: usize,
}

#[derive(Debug)]
struct CodeBlock {
    pre_index: usize,
    language: Option<Language>,
    text: String,
}

/// Replace every data block in `html` with a rendered table
pub fn render_data_blocks(
    html: &str,
    settings: &RenderSettings,
    sandbox: &LuaSandbox,
) -> Result<RenderOutcome, RenderError> {
    let blocks = collect_code_blocks(html)?;

    let mut replacements: HashMap<usize, String> = HashMap::new();
    let mut skipped = 0;
    for block in &blocks {
        let Some(language) = block.language else {
            continue;
        };
        if replacements.contains_key(&block.pre_index) {
            continue;
        }
        match render_block(&block.text, language, settings, sandbox) {
            Some(table) => {
                replacements.insert(block.pre_index, table);
            }
            None => skipped += 1,
        }
    }

    if replacements.is_empty() {
        return Ok(RenderOutcome {
            html: html.to_string(),
            rendered: 0,
            skipped,
        });
    }

    let rendered = replacements.len();
    let mut pre_index = 0;
    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("pre", move |el| {
                if let Some(table) = replacements.get(&pre_index) {
                    el.replace(table, ContentType::Html);
                }
                pre_index += 1;
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| RenderError::Rewrite(e.to_string()))?;

    Ok(RenderOutcome {
        html: output,
        rendered,
        skipped,
    })
}

/// First pass: the decoded text of each `pre > code` and its `<pre>` position
fn collect_code_blocks(html: &str) -> Result<Vec<CodeBlock>, RenderError> {
    let pre_count = Rc::new(Cell::new(0usize));
    let blocks: Rc<RefCell<Vec<CodeBlock>>> = Rc::new(RefCell::new(Vec::new()));

    let pres = Rc::clone(&pre_count);
    let opened = Rc::clone(&pre_count);
    let starts = Rc::clone(&blocks);
    let texts = Rc::clone(&blocks);

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("pre", move |_el| {
                    pres.set(pres.get() + 1);
                    Ok(())
                }),
                element!("pre > code", move |el| {
                    let class = el.get_attribute("class").unwrap_or_default();
                    starts.borrow_mut().push(CodeBlock {
                        pre_index: opened.get().saturating_sub(1),
                        language: Language::from_class(&class),
                        text: String::new(),
                    });
                    Ok(())
                }),
                text!("pre > code", move |chunk| {
                    if let Some(block) = texts.borrow_mut().last_mut() {
                        block.text.push_str(chunk.as_str());
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| RenderError::Rewrite(e.to_string()))?;

    let collected = blocks.take();
    Ok(collected
        .into_iter()
        .map(|mut block| {
            block.text = html_escape::decode_html_entities(&block.text).into_owned();
            block
        })
        .collect())
}

/// Build the replacement markup for one block, or `None` to leave it alone
fn render_block(
    text: &str,
    language: Language,
    settings: &RenderSettings,
    sandbox: &LuaSandbox,
) -> Option<String> {
    let (metadata, body) = split_frontmatter(text);
    if metadata.is_empty() {
        return None;
    }

    let data = match parse_body(body, language, OutputShape::Records) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!(lang = %language, "Leaving unparseable block untouched: {}", e);
            return None;
        }
    };

    let id = metadata.get("id").map(String::as_str).unwrap_or_default();
    let renderer = metadata.get("render").map(String::as_str);
    let table_class = escape_str(&settings.table_class);

    let table_body = render_table(&data, renderer, settings, sandbox);
    let footer = if !id.is_empty() && settings.show_api_link {
        build_footer(&FooterContext {
            id,
            language,
            column_count: columns(&data).len(),
            api_route: &settings.api_route,
            table_class: &settings.table_class,
        })
    } else {
        String::new()
    };

    Some(
        [
            format!(
                r#"<div class="{}-wrapper" data-json-api-id="{}" data-lang="{}">"#,
                table_class,
                escape_str(id),
                language
            ),
            format!(r#"  <table class="{}">"#, table_class),
            format!("    {}", table_body),
            format!("    {}", footer),
            "  </table>".to_string(),
            "</div>".to_string(),
        ]
        .join("\n"),
    )
}
