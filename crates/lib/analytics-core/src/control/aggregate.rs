use std::path::PathBuf;

use analytics_store::{AggregateFunction, AggregationSpec};

use crate::engine::aggregate::aggregate;
use crate::response::{TableData, TablePayload};

use super::{AnalyticsControlPlane, ControlError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRequest {
    pub path: PathBuf,
    pub spec: AggregationSpec,
}

impl AggregateRequest {
    pub fn new(path: impl Into<PathBuf>, spec: AggregationSpec) -> Self {
        Self {
            path: path.into(),
            spec,
        }
    }

    /// Builds a request from loosely typed function names.
    ///
    /// # Errors
    /// Returns `ControlError::Validation` for an unrecognized function name.
    pub fn from_names<S: AsRef<str>>(
        path: impl Into<PathBuf>,
        group_by: impl Into<String>,
        value_columns: Vec<String>,
        functions: &[S],
    ) -> Result<Self, ControlError> {
        let functions = functions
            .iter()
            .map(|name| name.as_ref().parse::<AggregateFunction>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            path,
            AggregationSpec {
                group_by: group_by.into(),
                value_columns,
                functions,
            },
        ))
    }
}

impl AnalyticsControlPlane {
    /// Groups a file's rows and aggregates the requested value columns.
    ///
    /// # Errors
    /// Returns `ControlError` if the file cannot be loaded or the spec is invalid.
    pub fn aggregate(&self, request: &AggregateRequest) -> Result<TablePayload, ControlError> {
        let typed = self.load(&request.path)?;
        let table = aggregate(&typed, &request.spec)?;
        Ok(TablePayload {
            source: request.path.display().to_string(),
            table: TableData::from(&table),
        })
    }
}
