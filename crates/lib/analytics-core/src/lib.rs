//! Core analysis engine for analytics-mcp.
//!
//! This crate loads delimited tabular files, infers column types, runs the
//! filter, aggregation and statistical report engines, and formats every
//! outcome into a uniform response payload for the MCP adapter.

pub mod control;
pub mod engine;
pub mod parsers;
pub mod response;
pub mod schema;
pub mod store;
