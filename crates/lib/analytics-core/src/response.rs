//! Uniform response payloads for every analysis outcome.
//!
//! Each operation result, success or failure, is rendered as one
//! [`AnalyticsResponse`] tagged by `kind`. Missing cells and undefined
//! statistics serialize as JSON `null`.

use std::fmt;

use analytics_store::{ColumnDescriptor, Dataset, FilterOperator, Value};
use serde::Serialize;

use crate::control::ControlError;
use crate::engine::report::ReportSection;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalyticsResponse {
    Table(TablePayload),
    Filtered(FilterPayload),
    Report(ReportPayload),
    Schema(SchemaPayload),
    Error(ErrorPayload),
}

impl AnalyticsResponse {
    /// Renders a control-plane result, downgrading any failure to an error payload.
    pub fn from_result<T>(result: Result<T, ControlError>) -> Self
    where
        T: Into<Self>,
    {
        match result {
            Ok(payload) => payload.into(),
            Err(err) => err.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Filtered(_) => "filtered",
            Self::Report(_) => "report",
            Self::Schema(_) => "schema",
            Self::Error(_) => "error",
        }
    }
}

/// Rows of a dataset, header first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
}

impl From<&Dataset> for TableData {
    fn from(dataset: &Dataset) -> Self {
        Self {
            columns: dataset.columns().to_vec(),
            rows: dataset.rows().to_vec(),
            row_count: dataset.row_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TablePayload {
    pub source: String,
    pub table: TableData,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterPayload {
    pub source: String,
    pub column: String,
    pub condition: FilterOperator,
    pub value: Value,
    pub matched_rows: usize,
    pub total_rows: usize,
    pub output_path: Option<String>,
    pub preview: TableData,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub source: String,
    pub row_count: usize,
    pub column_count: usize,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaPayload {
    pub source: String,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnDescriptor>,
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Parse,
    Validation,
    Computation,
    Io,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Parse => "parse",
            Self::Validation => "validation",
            Self::Computation => "computation",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&ControlError> for ErrorPayload {
    fn from(err: &ControlError) -> Self {
        Self {
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ControlError> for AnalyticsResponse {
    fn from(err: ControlError) -> Self {
        Self::Error(ErrorPayload::from(&err))
    }
}

impl From<TablePayload> for AnalyticsResponse {
    fn from(payload: TablePayload) -> Self {
        Self::Table(payload)
    }
}

impl From<FilterPayload> for AnalyticsResponse {
    fn from(payload: FilterPayload) -> Self {
        Self::Filtered(payload)
    }
}

impl From<ReportPayload> for AnalyticsResponse {
    fn from(payload: ReportPayload) -> Self {
        Self::Report(payload)
    }
}

impl From<SchemaPayload> for AnalyticsResponse {
    fn from(payload: SchemaPayload) -> Self {
        Self::Schema(payload)
    }
}
