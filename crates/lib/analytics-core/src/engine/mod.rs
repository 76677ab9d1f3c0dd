//! Analysis engines over typed datasets.
//!
//! Every engine is a pure function of a [`crate::schema::TypedDataset`] and
//! its typed arguments; domain constraints that the arguments violate surface
//! as [`ValidationError`].

pub mod aggregate;
pub mod filter;
pub mod report;
pub mod stats;

use std::{error::Error, fmt};

/// Error for arguments that break a domain constraint (unknown column,
/// operator/type mismatch, unrecognized function or report kind).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn unknown_column(name: &str, available: &[String]) -> Self {
        Self::new(format!(
            "unknown column: {name} (available: {})",
            available.join(", ")
        ))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ValidationError {}
