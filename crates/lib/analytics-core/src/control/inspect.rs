use std::path::PathBuf;

use crate::response::SchemaPayload;
use crate::schema;
use crate::store::LocalTableStore;

use super::{AnalyticsControlPlane, ControlError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectRequest {
    pub path: PathBuf,
}

impl InspectRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AnalyticsControlPlane {
    /// Describes the columns of a file: inferred kind, missing and distinct counts.
    ///
    /// # Errors
    /// Returns `ControlError::Store` if the file is missing or malformed.
    pub fn inspect(&self, request: &InspectRequest) -> Result<SchemaPayload, ControlError> {
        let dataset = LocalTableStore::load(&request.path)?;
        Ok(SchemaPayload {
            source: request.path.display().to_string(),
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            columns: schema::inspect(&dataset),
        })
    }
}
