//! Local file access for tabular datasets.
//!
//! The store layer resolves dataset paths, reads them through the parsers and
//! persists derived datasets.

pub mod local;

pub use local::{LocalTableStore, StoreError, StoreResult};
