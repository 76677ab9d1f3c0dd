use std::error::Error;
use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use analytics_store::Dataset;
use analytics_store::schema::FILTERED_SUFFIX;
use csv::WriterBuilder;
use tracing::debug;

use crate::parsers::{DelimitedOptions, DelimitedParser, TableParseError};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    NotFound(PathBuf),
    Parse {
        path: PathBuf,
        source: TableParseError,
    },
    Io {
        path: PathBuf,
        message: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::Parse { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Io { path, message } => {
                write!(f, "failed to write {}: {message}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::NotFound(_) | Self::Io { .. } => None,
        }
    }
}

/// Reads and writes delimited datasets on the local filesystem.
pub struct LocalTableStore;

impl LocalTableStore {
    /// Loads an untyped dataset from `path`.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` when the path is not a readable file and
    /// `StoreError::Parse` when its contents are not well-formed.
    pub fn load(path: &Path) -> StoreResult<Dataset> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|_| StoreError::NotFound(path.to_path_buf()))?;
        let options = Self::options_for(path);
        let dataset = DelimitedParser::parse(BufReader::new(file), &options).map_err(|source| {
            StoreError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(
            path = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Writes `dataset` to `path` using the delimiter implied by its extension.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the file cannot be created or written.
    pub fn write(path: &Path, dataset: &Dataset) -> StoreResult<()> {
        let io_err = |err: &dyn fmt::Display| StoreError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        let options = Self::options_for(path);
        let mut writer = WriterBuilder::new()
            .delimiter(options.delimiter)
            .from_path(path)
            .map_err(|err| io_err(&err))?;

        writer
            .write_record(dataset.columns())
            .map_err(|err| io_err(&err))?;
        for row in dataset.rows() {
            writer
                .write_record(row.iter().map(ToString::to_string))
                .map_err(|err| io_err(&err))?;
        }
        writer.flush().map_err(|err| io_err(&err))?;

        debug!(path = %path.display(), rows = dataset.row_count(), "wrote dataset");
        Ok(())
    }

    /// Derives `<stem>_filtered.<ext>` beside the input file.
    #[must_use]
    pub fn derived_output_path(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("dataset");
        let file_name = match input.extension().and_then(OsStr::to_str) {
            Some(ext) => format!("{stem}{FILTERED_SUFFIX}.{ext}"),
            None => format!("{stem}{FILTERED_SUFFIX}"),
        };
        input.with_file_name(file_name)
    }

    /// Whether two paths name the same file, resolving links when both exist.
    #[must_use]
    pub fn is_same_file(left: &Path, right: &Path) -> bool {
        match (left.canonicalize(), right.canonicalize()) {
            (Ok(left), Ok(right)) => left == right,
            _ => left == right,
        }
    }

    fn options_for(path: &Path) -> DelimitedOptions {
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("tsv" | "tab") => DelimitedOptions::new().with_delimiter(b'\t'),
            _ => DelimitedOptions::new(),
        }
    }
}
