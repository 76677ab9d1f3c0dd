use std::path::PathBuf;

use analytics_store::ReportKind;

use crate::engine::ValidationError;
use crate::engine::report::{build_report, resolve_kinds};
use crate::response::ReportPayload;

use super::{AnalyticsControlPlane, ControlError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub path: PathBuf,
    pub kinds: Vec<ReportKind>,
}

impl ReportRequest {
    pub fn new(path: impl Into<PathBuf>, kinds: Vec<ReportKind>) -> Self {
        Self {
            path: path.into(),
            kinds,
        }
    }

    /// Builds a request from report names; one unknown name rejects them all.
    ///
    /// # Errors
    /// Returns `ControlError::Validation` for an empty or invalid name list.
    pub fn from_names<S: AsRef<str>>(
        path: impl Into<PathBuf>,
        names: &[S],
    ) -> Result<Self, ControlError> {
        Ok(Self::new(path, resolve_kinds(names)?))
    }
}

impl AnalyticsControlPlane {
    /// Computes the requested reports over a file, one section per kind.
    ///
    /// # Errors
    /// Returns `ControlError` if the file cannot be loaded or no kind is requested.
    pub fn report(&self, request: &ReportRequest) -> Result<ReportPayload, ControlError> {
        if request.kinds.is_empty() {
            return Err(ValidationError::new("at least one report kind is required").into());
        }
        let typed = self.load(&request.path)?;
        Ok(ReportPayload {
            source: request.path.display().to_string(),
            row_count: typed.dataset.row_count(),
            column_count: typed.dataset.column_count(),
            sections: build_report(&typed, &request.kinds),
        })
    }
}
