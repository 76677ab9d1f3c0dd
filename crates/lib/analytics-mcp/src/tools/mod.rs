//! MCP tool modules.
//!
//! Tools are grouped by domain: reports and schema inspection, row-level data
//! operations, and contextual help.

pub mod analysis;
pub mod data;
mod context;
