use std::{error::Error, fmt, path::Path};

use analytics_store::UnknownTokenError;
use tracing::{debug, warn};

use crate::engine::ValidationError;
use crate::response::{AnalyticsResponse, ErrorKind};
use crate::schema::TypedDataset;
use crate::store::{LocalTableStore, StoreError};

pub mod aggregate;
pub mod filter;
pub mod inspect;
pub mod report;

pub use aggregate::AggregateRequest;
pub use filter::{FilterOutput, FilterRequest};
pub use inspect::InspectRequest;
pub use report::ReportRequest;

/// Default number of matching rows returned inline by a filter.
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

#[derive(Debug)]
pub enum ControlError {
    Store(StoreError),
    Validation(ValidationError),
    Computation(String),
}

impl ControlError {
    /// Machine-readable category of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            Self::Store(StoreError::Parse { .. }) => ErrorKind::Parse,
            Self::Store(StoreError::Io { .. }) => ErrorKind::Io,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Computation(_) => ErrorKind::Computation,
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Computation(message) => write!(f, "computation failed: {message}"),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Computation(_) => None,
        }
    }
}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<ValidationError> for ControlError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<UnknownTokenError> for ControlError {
    fn from(err: UnknownTokenError) -> Self {
        Self::Validation(ValidationError::new(err.to_string()))
    }
}

/// Tunables shared by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOptions {
    pub preview_rows: usize,
}

impl ControlOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    #[must_use]
    pub const fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One analysis call with its typed arguments.
#[derive(Debug, Clone)]
pub enum OperationRequest {
    Inspect(InspectRequest),
    Filter(FilterRequest),
    Aggregate(AggregateRequest),
    Report(ReportRequest),
}

impl OperationRequest {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Inspect(_) => "inspect",
            Self::Filter(_) => "filter",
            Self::Aggregate(_) => "aggregate",
            Self::Report(_) => "report",
        }
    }
}

/// Entry point for adapters. Every call loads its own dataset; nothing is
/// cached between calls.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsControlPlane {
    options: ControlOptions,
}

impl AnalyticsControlPlane {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_options(options: ControlOptions) -> Self {
        Self { options }
    }

    /// Runs `request` and renders its outcome. Never fails; errors become
    /// error payloads.
    #[must_use]
    pub fn execute(&self, request: OperationRequest) -> AnalyticsResponse {
        let operation = request.name();
        let result: Result<AnalyticsResponse, ControlError> = match request {
            OperationRequest::Inspect(request) => self.inspect(&request).map(Into::into),
            OperationRequest::Filter(request) => self.filter(&request).map(Into::into),
            OperationRequest::Aggregate(request) => self.aggregate(&request).map(Into::into),
            OperationRequest::Report(request) => self.report(&request).map(Into::into),
        };
        if let Err(err) = &result {
            warn!(operation, kind = %err.kind(), error = %err, "analysis failed");
        }
        AnalyticsResponse::from_result(result)
    }

    /// Loads `path` and types its columns.
    ///
    /// # Errors
    /// Returns `ControlError::Store` if the file is missing or malformed.
    pub fn load(&self, path: &Path) -> Result<TypedDataset, ControlError> {
        let dataset = LocalTableStore::load(path)?;
        let typed = TypedDataset::from_dataset(dataset);
        debug!(
            path = %path.display(),
            columns = typed.descriptors.len(),
            "typed dataset"
        );
        Ok(typed)
    }
}
