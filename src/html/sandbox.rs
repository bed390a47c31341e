//! Sandbox for user-supplied table renderers
//!
//! Renderer code is the body of a Lua 5.4 function. It receives the parsed
//! block as `data` and the derived column names as `columns`, and must
//! return the table body markup as a string:
//!
//! ```lua
//! local out = {"<tbody>"}
//! for _, row in ipairs(data) do
//!   out[#out + 1] = "<tr><td>" .. escape(row.name) .. "</td></tr>"
//! end
//! out[#out + 1] = "</tbody>"
//! return table.concat(out)
//! ```
//!
//! # Trust boundary
//!
//! The returned string is inserted into the page without escaping. Renderer
//! authors are trusted to escape values themselves (the `escape` global is
//! provided for that). What the code can reach is limited: a fresh Lua state
//! per call with only the `table`, `string`, `math` and `utf8` libraries, an
//! instruction budget and a memory limit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mlua::{HookTriggers, Lua, LuaOptions, LuaSerdeExt, StdLib, VmState};
use serde_json::Value;
use thiserror::Error;

use super::table::format_float;

/// Instructions executed between budget checks
const HOOK_INTERVAL: u32 = 1_000;
/// Default instruction budget per renderer call
pub const DEFAULT_INSTRUCTION_BUDGET: u64 = 5_000_000;
/// Default memory limit per renderer call
pub const DEFAULT_MEMORY_LIMIT: usize = 16 * 1024 * 1024;

/// Custom renderer failures
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("Renderer returned {0} instead of a string")]
    NonStringResult(&'static str),

    #[error("Renderer exceeded its budget of {0} instructions")]
    BudgetExceeded(u64),
}

/// Limits applied to each custom renderer call
#[derive(Debug, Clone)]
pub struct LuaSandbox {
    pub instruction_budget: u64,
    pub memory_limit: usize,
}

impl Default for LuaSandbox {
    fn default() -> Self {
        Self {
            instruction_budget: DEFAULT_INSTRUCTION_BUDGET,
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl LuaSandbox {
    /// Run renderer `code` against `data` and `columns`
    pub fn render(&self, code: &str, data: &Value, columns: &[String]) -> Result<String, SandboxError> {
        let lua = Lua::new_with(
            StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::UTF8,
            LuaOptions::default(),
        )?;
        lua.set_memory_limit(self.memory_limit)?;

        let executed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&executed);
        let budget = self.instruction_budget;
        lua.set_hook(
            HookTriggers::new().every_nth_instruction(HOOK_INTERVAL),
            move |_, _| {
                let total = counter.fetch_add(u64::from(HOOK_INTERVAL), Ordering::Relaxed)
                    + u64::from(HOOK_INTERVAL);
                if total > budget {
                    Err(mlua::Error::runtime("instruction budget exceeded"))
                } else {
                    Ok(VmState::Continue)
                }
            },
        )?;

        let escape = lua.create_function(|lua, value: mlua::Value| {
            let text = cell_text(lua, value)?;
            Ok(html_escape::encode_quoted_attribute(&text).into_owned())
        })?;
        lua.globals().set("escape", escape)?;

        let data = lua.to_value(data)?;
        let columns = lua.to_value(columns)?;

        let chunk = format!("local data, columns = ...\n{}", code);
        let function = lua.load(chunk.as_str()).set_name("renderer").into_function()?;

        let result = match function.call::<mlua::Value>((data, columns)) {
            Ok(result) => result,
            Err(_) if executed.load(Ordering::Relaxed) > budget => {
                return Err(SandboxError::BudgetExceeded(budget));
            }
            Err(e) => return Err(e.into()),
        };

        match result {
            mlua::Value::String(s) => Ok(s.to_string_lossy()),
            other => Err(SandboxError::NonStringResult(other.type_name())),
        }
    }
}

/// Cell text of a Lua value; `nil` and JSON `null` are empty
fn cell_text(lua: &Lua, value: mlua::Value) -> mlua::Result<String> {
    Ok(match value {
        mlua::Value::Nil => String::new(),
        v if v.is_null() => String::new(),
        mlua::Value::Boolean(b) => b.to_string(),
        mlua::Value::Integer(i) => i.to_string(),
        mlua::Value::Number(n) => format_float(n),
        mlua::Value::String(s) => s.to_string_lossy(),
        other => lua.globals().get::<mlua::Function>("tostring")?.call::<String>(other)?,
    })
}
