//! Data Gremlin
//!
//! Structured data blocks embedded in markdown pages, served over HTTP and
//! rendered as HTML tables. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `block`: Block extraction, frontmatter and format parsing
//! - `cache`: TTL cache of parsed blocks
//! - `lookup`: Corpus scan and cache-fronted resolution
//! - `events`: Document mutation events and cache invalidation
//! - `html`: In-page table rendering and the Lua renderer sandbox
//! - `store` / `db`: Page corpus backends (memory, SQLite)
//! - `routes`: HTTP endpoints

pub mod block;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod html;
pub mod lookup;
pub mod routes;
pub mod settings;
pub mod state;
pub mod store;
