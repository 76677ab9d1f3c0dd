//! Parsers for tabular source files.
//!
//! Parsers turn raw bytes into an untyped [`analytics_store::Dataset`] whose
//! cells are text or missing; typing happens in [`crate::schema`].

pub mod delimited;

pub use delimited::{DelimitedOptions, DelimitedParser, TableParseError};
