use std::path::PathBuf;

use analytics_store::FilterPredicate;
use tracing::info;

use crate::engine::{ValidationError, filter};
use crate::response::{FilterPayload, TableData};
use crate::schema::TypedDataset;
use crate::store::LocalTableStore;

use super::{AnalyticsControlPlane, ControlError};

/// Where, if anywhere, the filtered rows are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterOutput {
    #[default]
    None,
    /// `<stem>_filtered.<ext>` beside the input.
    Derived,
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRequest {
    pub path: PathBuf,
    pub predicate: FilterPredicate,
    pub output: FilterOutput,
    /// Overrides the configured preview size.
    pub preview_rows: Option<usize>,
}

impl FilterRequest {
    pub fn new(path: impl Into<PathBuf>, predicate: FilterPredicate) -> Self {
        Self {
            path: path.into(),
            predicate,
            output: FilterOutput::None,
            preview_rows: None,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: FilterOutput) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub const fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = Some(preview_rows);
        self
    }
}

impl AnalyticsControlPlane {
    /// Filters a file by one predicate, optionally persisting the matching rows.
    ///
    /// Persisted rows keep their source text; the preview carries typed values.
    ///
    /// # Errors
    /// Returns `ControlError` if the file cannot be loaded, the predicate is
    /// invalid, the output path is the input file, or the write fails.
    pub fn filter(&self, request: &FilterRequest) -> Result<FilterPayload, ControlError> {
        let raw = LocalTableStore::load(&request.path)?;
        let typed = TypedDataset::from_dataset(raw.clone());
        let matches = filter::matching_rows(&typed, &request.predicate)?;

        let output_path = match &request.output {
            FilterOutput::None => None,
            FilterOutput::Derived => Some(LocalTableStore::derived_output_path(&request.path)),
            FilterOutput::Path(path) => Some(path.clone()),
        };
        if let Some(target) = &output_path {
            if LocalTableStore::is_same_file(&request.path, target) {
                return Err(ValidationError::new(format!(
                    "output path {} would overwrite the input file",
                    target.display()
                ))
                .into());
            }
            LocalTableStore::write(target, &raw.select_rows(&matches))?;
            info!(
                path = %target.display(),
                rows = matches.len(),
                "saved filtered dataset"
            );
        }

        let limit = request.preview_rows.unwrap_or(self.options.preview_rows);
        let preview = typed
            .dataset
            .select_rows(&matches[..matches.len().min(limit)]);

        Ok(FilterPayload {
            source: request.path.display().to_string(),
            column: request.predicate.column.clone(),
            condition: request.predicate.operator,
            value: request.predicate.value.clone(),
            matched_rows: matches.len(),
            total_rows: typed.dataset.row_count(),
            output_path: output_path.map(|path| path.display().to_string()),
            preview: TableData::from(&preview),
        })
    }
}
