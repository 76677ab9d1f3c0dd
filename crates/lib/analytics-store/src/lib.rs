//! Tabular data model and schema helpers for analytics-mcp.
//!
//! This crate defines the cell values, datasets and operation vocabularies
//! shared by the loader, the analysis engines and the MCP adapter.

pub mod models;
pub mod schema;

pub use models::*;
