//! Embedded data blocks
//!
//! Fenced, frontmatter-tagged blocks inside markdown documents:
//!
//! ````text
//! ```json
//! ---
//! id: quarterly
//! render: bars
//! ---
//! [{"quarter": "Q1", "revenue": 120}]
//! ```
//! ````
//!
//! Both the API path and the in-page render path parse bodies through
//! [`parse_body`]; only the [`OutputShape`] differs.

mod error;
mod extract;
mod format;
mod frontmatter;
mod types;

pub use error::{BlockError, Result};
pub use extract::{extract_block, parse_block, raw_blocks};
pub use format::{data_content_type, parse_body, parse_delimited, OutputShape};
pub use frontmatter::split_frontmatter;
pub use types::{mime, raw_content_type, Language, Metadata, ParsedBlock, RawBlock};
