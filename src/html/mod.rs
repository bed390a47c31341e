//! HTML processing module
//!
//! Turns data blocks in rendered pages into tables:
//! - Default shape-driven table layouts
//! - Custom Lua renderers behind a sandbox
//! - Footer links to the block API
//!
//! Uses lol_html for streaming HTML rewriting.

mod blocks;
mod footer;
mod sandbox;
mod table;

pub use blocks::{render_data_blocks, RenderError, RenderOutcome};
pub use footer::{build_footer, interpolate_route, FooterContext};
pub use sandbox::{LuaSandbox, SandboxError, DEFAULT_INSTRUCTION_BUDGET, DEFAULT_MEMORY_LIMIT};
pub use table::{columns, escape_str, escape_value, render_default, render_table};
