use std::{error::Error, fmt, io::Read};

use analytics_store::schema::is_missing_token;
use analytics_store::{Dataset, DatasetError, Value};
use csv::{ReaderBuilder, StringRecord};

/// Options for parsing delimited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedOptions {
    pub delimiter: u8,
}

impl DelimitedOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self { delimiter: b',' }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for malformed tabular input.
#[derive(Debug)]
pub struct TableParseError {
    message: String,
}

impl TableParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TableParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tabular parse error: {}", self.message)
    }
}

impl Error for TableParseError {}

impl From<csv::Error> for TableParseError {
    fn from(err: csv::Error) -> Self {
        let message = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => {
                let line = pos.as_ref().map_or(0, csv::Position::line);
                format!("line {line} has {len} fields, expected {expected_len}")
            }
            csv::ErrorKind::Utf8 { pos, err } => {
                let line = pos.as_ref().map_or(0, csv::Position::line);
                format!("line {line} is not valid UTF-8: {err}")
            }
            _ => err.to_string(),
        };
        Self::new(message)
    }
}

impl From<DatasetError> for TableParseError {
    fn from(err: DatasetError) -> Self {
        Self::new(err.to_string())
    }
}

/// Parser for comma- or tab-delimited files with a header row.
pub struct DelimitedParser;

impl DelimitedParser {
    /// Reads a header row and every record into an untyped dataset.
    ///
    /// # Errors
    /// Returns `TableParseError` on ragged rows, invalid UTF-8 or duplicate headers.
    pub fn parse<R: Read>(reader: R, options: &DelimitedOptions) -> Result<Dataset, TableParseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record_to_row(&record?));
        }

        Ok(Dataset::new(columns, rows)?)
    }
}

fn record_to_row(record: &StringRecord) -> Vec<Value> {
    record
        .iter()
        .map(|cell| {
            if is_missing_token(cell) {
                Value::Missing
            } else {
                Value::Text(cell.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_missing_cells() {
        let input = "region,revenue\nA,100\nB,\nC,NA\n";
        let dataset = DelimitedParser::parse(input.as_bytes(), &DelimitedOptions::new())
            .expect("well-formed csv parses");

        assert_eq!(dataset.columns(), ["region", "revenue"]);
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.rows()[0][1], Value::Text("100".to_string()));
        assert!(dataset.rows()[1][1].is_missing());
        assert!(dataset.rows()[2][1].is_missing());
    }

    #[test]
    fn ragged_rows_are_parse_errors() {
        let input = "a,b\n1,2\n3\n";
        let err = DelimitedParser::parse(input.as_bytes(), &DelimitedOptions::new())
            .expect_err("ragged rows must fail");
        assert!(err.message().contains("expected 2"), "unexpected message: {err}");
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let input: &[u8] = b"a,b\n1,\xff\n";
        assert!(DelimitedParser::parse(input, &DelimitedOptions::new()).is_err());
    }

    #[test]
    fn duplicate_headers_are_parse_errors() {
        let input = "a,a\n1,2\n";
        let err = DelimitedParser::parse(input.as_bytes(), &DelimitedOptions::new())
            .expect_err("duplicate headers must fail");
        assert!(err.message().contains("duplicate column"));
    }

    #[test]
    fn tab_delimiter_is_honored() {
        let input = "a\tb\n1\t2\n";
        let options = DelimitedOptions::new().with_delimiter(b'\t');
        let dataset = DelimitedParser::parse(input.as_bytes(), &options).expect("tsv parses");
        assert_eq!(dataset.column_count(), 2);
    }

    #[test]
    fn empty_input_yields_empty_dataset() {
        let dataset = DelimitedParser::parse("".as_bytes(), &DelimitedOptions::new())
            .expect("empty input parses");
        assert_eq!(dataset.column_count(), 0);
        assert_eq!(dataset.row_count(), 0);
    }
}
