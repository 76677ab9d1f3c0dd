use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};

use crate::schema::{
    DATE_DISPLAY_FORMAT,
    DATETIME_DISPLAY_FORMAT,
    REPORT_CORRELATION,
    REPORT_DISTRIBUTION,
    REPORT_MISSING,
    REPORT_SUMMARY,
};

// ---------------------------------------------------------------------------
// Value: a single cell
// ---------------------------------------------------------------------------

/// A typed cell. Loaded datasets carry only `Text` and `Missing` until the
/// schema inspector coerces them.
#[derive(Debug, Clone)]
pub enum Value {
    Missing,
    Boolean(bool),
    Number(f64),
    Temporal(NaiveDateTime),
    Text(String),
}

impl Value {
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Boolean(_) => 1,
            Self::Number(_) => 2,
            Self::Temporal(_) => 3,
            Self::Text(_) => 4,
        }
    }
}

// Total order so values can key maps and sort group output: variant rank
// first, then the native order within a variant.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Temporal(a), Self::Temporal(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Missing => {}
            Self::Boolean(value) => value.hash(state),
            Self::Number(value) => value.to_bits().hash(state),
            Self::Temporal(value) => value.hash(state),
            Self::Text(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Temporal(value) => {
                let format = if value.time().num_seconds_from_midnight() == 0
                    && value.time().nanosecond() == 0
                {
                    DATE_DISPLAY_FORMAT
                } else {
                    DATETIME_DISPLAY_FORMAT
                };
                write!(f, "{}", value.format(format))
            }
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Boolean(value) => serializer.serialize_bool(*value),
            Self::Number(value) => serializer.serialize_f64(*value),
            Self::Text(value) => serializer.serialize_str(value),
            Self::Temporal(_) => serializer.collect_str(self),
        }
    }
}

// ---------------------------------------------------------------------------
// Column descriptors
// ---------------------------------------------------------------------------

/// Inferred column type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
    Temporal,
    Boolean,
}

impl ColumnKind {
    /// Kinds with a native ordering usable by range predicates and group sorting.
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        matches!(self, Self::Numeric | Self::Temporal)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Temporal => "temporal",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-column metadata derived by the schema inspector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    pub distinct_count: usize,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    DuplicateColumn(String),
    WidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumn(name) => write!(f, "duplicate column name: {name}"),
            Self::WidthMismatch {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} fields, expected {expected}"),
        }
    }
}

impl Error for DatasetError {}

/// Immutable rows aligned positionally with an ordered column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Builds a dataset, checking column names are unique and every row is full width.
    ///
    /// # Errors
    /// Returns `DatasetError` when the invariants do not hold.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, DatasetError> {
        for (index, name) in columns.iter().enumerate() {
            if columns[..index].contains(name) {
                return Err(DatasetError::DuplicateColumn(name.clone()));
            }
        }
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
            .map(|(index, row)| (index, row.len()))
        {
            return Err(DatasetError::WidthMismatch {
                row,
                expected: columns.len(),
                found,
            });
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterates one column top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Returns a new dataset holding the rows at `indices`, in the given order.
    /// Out-of-range indices are skipped.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|index| self.rows.get(*index))
                .cloned()
                .collect(),
        }
    }

    /// Rewrites every cell, passing its column index.
    #[must_use]
    pub fn map_cells<F>(self, mut map: F) -> Self
    where
        F: FnMut(usize, Value) -> Value,
    {
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .map(|(index, value)| map(index, value))
                    .collect()
            })
            .collect();
        Self {
            columns: self.columns,
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Operation vocabularies
// ---------------------------------------------------------------------------

/// Error for an operator, function or report token that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTokenError {
    pub category: &'static str,
    pub token: String,
}

impl fmt::Display for UnknownTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.category, self.token)
    }
}

impl Error for UnknownTokenError {}

fn normalize_token(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('-', "_")
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterOrEqual => "greater_or_equal",
            Self::LessOrEqual => "less_or_equal",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
        }
    }

    /// Range operators need a numeric or temporal column.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::LessThan | Self::GreaterOrEqual | Self::LessOrEqual
        )
    }

    /// Substring operators need a text column.
    #[must_use]
    pub const fn is_text_match(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

impl FromStr for FilterOperator {
    type Err = UnknownTokenError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_token(raw).as_str() {
            "=" | "==" | "eq" | "equals" => Ok(Self::Equals),
            "!=" | "<>" | "ne" | "not_equals" => Ok(Self::NotEquals),
            ">" | "gt" | "greater_than" => Ok(Self::GreaterThan),
            "<" | "lt" | "less_than" => Ok(Self::LessThan),
            ">=" | "ge" | "greater_or_equal" => Ok(Self::GreaterOrEqual),
            "<=" | "le" | "less_or_equal" => Ok(Self::LessOrEqual),
            "contains" => Ok(Self::Contains),
            "startswith" | "starts_with" => Ok(Self::StartsWith),
            "endswith" | "ends_with" => Ok(Self::EndsWith),
            _ => Err(UnknownTokenError {
                category: "filter condition",
                token: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single column/operator/value condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    pub column: String,
    pub operator: FilterOperator,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Mean,
    Sum,
    Count,
    Min,
    Max,
    Median,
}

impl AggregateFunction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
        }
    }

    #[must_use]
    pub const fn requires_numeric(self) -> bool {
        !matches!(self, Self::Count)
    }
}

impl FromStr for AggregateFunction {
    type Err = UnknownTokenError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_token(raw).as_str() {
            "mean" | "avg" | "average" => Ok(Self::Mean),
            "sum" => Ok(Self::Sum),
            "count" => Ok(Self::Count),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "median" => Ok(Self::Median),
            _ => Err(UnknownTokenError {
                category: "aggregation function",
                token: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group-by column plus the value columns and functions to apply to each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSpec {
    pub group_by: String,
    pub value_columns: Vec<String>,
    pub functions: Vec<AggregateFunction>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Summary,
    Correlation,
    Missing,
    Distribution,
}

impl ReportKind {
    pub const ALL: [Self; 4] = [
        Self::Summary,
        Self::Correlation,
        Self::Missing,
        Self::Distribution,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => REPORT_SUMMARY,
            Self::Correlation => REPORT_CORRELATION,
            Self::Missing => REPORT_MISSING,
            Self::Distribution => REPORT_DISTRIBUTION,
        }
    }
}

impl FromStr for ReportKind {
    type Err = UnknownTokenError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(raw);
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == token)
            .ok_or_else(|| UnknownTokenError {
                category: "report kind",
                token: raw.to_string(),
            })
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Value {
        Value::Text(value.to_string())
    }

    #[test]
    fn dataset_rejects_ragged_rows() {
        let err = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![text("1"), text("2")], vec![text("3")]],
        )
        .expect_err("ragged rows must fail");
        assert_eq!(
            err,
            DatasetError::WidthMismatch {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn dataset_rejects_duplicate_columns() {
        let err = Dataset::new(vec!["a".to_string(), "a".to_string()], Vec::new())
            .expect_err("duplicate columns must fail");
        assert_eq!(err, DatasetError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn operator_tokens_accept_symbols_and_words() {
        assert_eq!("=".parse::<FilterOperator>(), Ok(FilterOperator::Equals));
        assert_eq!("Greater-Than".parse::<FilterOperator>(), Ok(FilterOperator::GreaterThan));
        assert_eq!("startswith".parse::<FilterOperator>(), Ok(FilterOperator::StartsWith));
        assert!("like".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn report_kind_parse_is_case_insensitive() {
        assert_eq!("Correlation".parse::<ReportKind>(), Ok(ReportKind::Correlation));
        let err = "histogram".parse::<ReportKind>().expect_err("unknown kind");
        assert_eq!(err.to_string(), "unknown report kind: histogram");
    }

    #[test]
    fn value_serializes_missing_as_null() {
        let json = serde_json::to_string(&vec![Value::Missing, Value::Number(2.5), text("x")])
            .expect("serialize values");
        assert_eq!(json, r#"[null,2.5,"x"]"#);
    }

    #[test]
    fn temporal_display_drops_midnight_time() {
        let midnight = crate::schema::parse_temporal("2024-01-02").expect("date");
        assert_eq!(Value::Temporal(midnight).to_string(), "2024-01-02");
        let noon = crate::schema::parse_temporal("2024-01-02 12:00:00").expect("datetime");
        assert_eq!(Value::Temporal(noon).to_string(), "2024-01-02T12:00:00");
        let json = serde_json::to_string(&Value::Temporal(noon)).expect("serialize temporal");
        assert_eq!(json, r#""2024-01-02T12:00:00""#);
    }
}
