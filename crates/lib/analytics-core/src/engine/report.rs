//! Statistical reports: summary, correlation, missing values and distribution.

use std::collections::HashMap;

use analytics_store::{ColumnKind, ReportKind, Value};
use serde::Serialize;
use tracing::debug;

use super::{ValidationError, stats};
use crate::schema::TypedDataset;

/// One computed report, tagged by its kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum ReportSection {
    Summary(SummaryReport),
    Correlation(CorrelationReport),
    Missing(MissingReport),
    Distribution(DistributionReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Text(CategoricalSummary),
    Boolean(CategoricalSummary),
    Temporal(TemporalSummary),
}

#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoricalSummary {
    pub name: String,
    pub count: usize,
    pub distinct: usize,
    pub top: Option<Value>,
    pub top_frequency: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemporalSummary {
    pub name: String,
    pub count: usize,
    pub distinct: usize,
    pub top: Option<Value>,
    pub top_frequency: usize,
    pub earliest: Option<Value>,
    pub latest: Option<Value>,
}

/// Symmetric Pearson matrix; `matrix[i][j]` pairs `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationReport {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingReport {
    pub row_count: usize,
    pub columns: Vec<MissingEntry>,
    pub total_missing: usize,
    pub total_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingEntry {
    pub name: String,
    pub missing_count: usize,
    pub missing_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub columns: Vec<DistributionEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionEntry {
    pub name: String,
    pub count: usize,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub mode: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

/// Parses report kind names, rejecting the whole list if any is unknown.
///
/// Duplicates collapse to the first occurrence.
///
/// # Errors
/// Returns `ValidationError` for an empty list or an unrecognized kind.
pub fn resolve_kinds<S: AsRef<str>>(names: &[S]) -> Result<Vec<ReportKind>, ValidationError> {
    if names.is_empty() {
        return Err(ValidationError::new("at least one report kind is required"));
    }
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind: ReportKind = name.as_ref().parse().map_err(|err| {
            let available: Vec<&str> = ReportKind::ALL.iter().map(|kind| kind.as_str()).collect();
            ValidationError::new(format!("{err} (available: {})", available.join(", ")))
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Computes one section per requested kind, in request order.
#[must_use]
pub fn build_report(data: &TypedDataset, kinds: &[ReportKind]) -> Vec<ReportSection> {
    let sections: Vec<ReportSection> = kinds
        .iter()
        .map(|kind| match kind {
            ReportKind::Summary => ReportSection::Summary(summary(data)),
            ReportKind::Correlation => ReportSection::Correlation(correlation(data)),
            ReportKind::Missing => ReportSection::Missing(missing(data)),
            ReportKind::Distribution => ReportSection::Distribution(distribution(data)),
        })
        .collect();
    debug!(
        rows = data.dataset.row_count(),
        sections = sections.len(),
        "built report"
    );
    sections
}

fn numbers(data: &TypedDataset, index: usize) -> Vec<f64> {
    data.dataset
        .column_values(index)
        .filter_map(Value::as_f64)
        .collect()
}

#[must_use]
pub fn summary(data: &TypedDataset) -> SummaryReport {
    let columns = data
        .descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            let name = descriptor.name.clone();
            match descriptor.kind {
                ColumnKind::Numeric => {
                    let values = numbers(data, index);
                    let sorted = stats::sorted(&values);
                    ColumnSummary::Numeric(NumericSummary {
                        name,
                        count: values.len(),
                        mean: stats::mean(&values),
                        std: stats::std_dev(&values),
                        min: sorted.first().copied(),
                        q25: stats::quantile_sorted(&sorted, 0.25),
                        median: stats::quantile_sorted(&sorted, 0.5),
                        q75: stats::quantile_sorted(&sorted, 0.75),
                        max: sorted.last().copied(),
                    })
                }
                ColumnKind::Text => ColumnSummary::Text(categorical(data, index, name)),
                ColumnKind::Boolean => ColumnSummary::Boolean(categorical(data, index, name)),
                ColumnKind::Temporal => {
                    let base = categorical(data, index, name);
                    let present = || data.dataset.column_values(index).filter(|v| !v.is_missing());
                    ColumnSummary::Temporal(TemporalSummary {
                        earliest: present().min().cloned(),
                        latest: present().max().cloned(),
                        name: base.name,
                        count: base.count,
                        distinct: base.distinct,
                        top: base.top,
                        top_frequency: base.top_frequency,
                    })
                }
            }
        })
        .collect();

    SummaryReport {
        row_count: data.dataset.row_count(),
        column_count: data.dataset.column_count(),
        columns,
    }
}

// Most frequent value wins; ties go to the smallest value.
fn categorical(data: &TypedDataset, index: usize, name: String) -> CategoricalSummary {
    let mut frequencies: HashMap<&Value, usize> = HashMap::new();
    let mut count = 0;
    for value in data.dataset.column_values(index) {
        if value.is_missing() {
            continue;
        }
        count += 1;
        *frequencies.entry(value).or_insert(0) += 1;
    }
    let top = frequencies
        .iter()
        .max_by(|(left, left_count), (right, right_count)| {
            left_count.cmp(right_count).then_with(|| right.cmp(left))
        })
        .map(|(value, frequency)| ((*value).clone(), *frequency));

    CategoricalSummary {
        name,
        count,
        distinct: frequencies.len(),
        top_frequency: top.as_ref().map_or(0, |(_, frequency)| *frequency),
        top: top.map(|(value, _)| value),
    }
}

/// Pearson correlation between every pair of numeric columns, over rows
/// where both values are present.
#[must_use]
pub fn correlation(data: &TypedDataset) -> CorrelationReport {
    let numeric = data.columns_of_kind(ColumnKind::Numeric);
    if numeric.len() < 2 {
        return CorrelationReport::default();
    }

    let mut matrix = vec![vec![None; numeric.len()]; numeric.len()];
    for (i, &left) in numeric.iter().enumerate() {
        for (j, &right) in numeric.iter().enumerate().skip(i) {
            let coefficient = if i == j {
                stats::has_spread(&numbers(data, left)).then_some(1.0)
            } else {
                let pairs: Vec<(f64, f64)> = data
                    .dataset
                    .rows()
                    .iter()
                    .filter_map(|row| {
                        let x = row.get(left).and_then(Value::as_f64)?;
                        let y = row.get(right).and_then(Value::as_f64)?;
                        Some((x, y))
                    })
                    .collect();
                stats::pearson(&pairs)
            };
            matrix[i][j] = coefficient;
            matrix[j][i] = coefficient;
        }
    }

    CorrelationReport {
        columns: numeric
            .iter()
            .map(|&index| data.descriptors[index].name.clone())
            .collect(),
        matrix,
    }
}

#[must_use]
pub fn missing(data: &TypedDataset) -> MissingReport {
    let row_count = data.dataset.row_count();
    let columns: Vec<MissingEntry> = data
        .descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            let missing_count = data
                .dataset
                .column_values(index)
                .filter(|value| value.is_missing())
                .count();
            MissingEntry {
                name: descriptor.name.clone(),
                missing_count,
                missing_percent: stats::percent(missing_count, row_count),
            }
        })
        .collect();
    let total_missing = columns.iter().map(|entry| entry.missing_count).sum();

    MissingReport {
        row_count,
        total_percent: stats::percent(total_missing, row_count * data.dataset.column_count()),
        total_missing,
        columns,
    }
}

#[must_use]
pub fn distribution(data: &TypedDataset) -> DistributionReport {
    let columns = data
        .columns_of_kind(ColumnKind::Numeric)
        .into_iter()
        .map(|index| {
            let values = numbers(data, index);
            let sorted = stats::sorted(&values);
            DistributionEntry {
                name: data.descriptors[index].name.clone(),
                count: values.len(),
                min: sorted.first().copied(),
                q25: stats::quantile_sorted(&sorted, 0.25),
                median: stats::quantile_sorted(&sorted, 0.5),
                q75: stats::quantile_sorted(&sorted, 0.75),
                max: sorted.last().copied(),
                mean: stats::mean(&values),
                std: stats::std_dev(&values),
                mode: stats::mode(&values),
                skewness: stats::skewness(&values),
                kurtosis: stats::kurtosis(&values),
            }
        })
        .collect();
    DistributionReport { columns }
}

#[cfg(test)]
mod tests {
    use analytics_store::Dataset;

    use super::*;

    fn typed(columns: &[&str], rows: &[&[&str]]) -> TypedDataset {
        let rows: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|raw| {
                        if raw.is_empty() {
                            Value::Missing
                        } else {
                            Value::Text((*raw).to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        let columns: Vec<String> = columns.iter().map(|name| (*name).to_string()).collect();
        TypedDataset::from_dataset(Dataset::new(columns, rows).expect("valid dataset"))
    }

    fn sales() -> TypedDataset {
        typed(
            &["region", "revenue", "units"],
            &[
                &["A", "100", "1"],
                &["B", "200", "2"],
                &["A", "300", "3"],
                &["B", "", "4"],
            ],
        )
    }

    #[test]
    fn unknown_kind_fails_the_whole_request() {
        let err = resolve_kinds(&["summary", "histogram"]).expect_err("must be rejected");
        assert!(err.message().contains("histogram"));
        assert!(resolve_kinds::<&str>(&[]).is_err());
        assert_eq!(
            resolve_kinds(&["Summary", "summary", "missing"]).expect("valid kinds"),
            vec![ReportKind::Summary, ReportKind::Missing]
        );
    }

    #[test]
    fn summary_covers_every_column() {
        let report = summary(&sales());
        assert_eq!(report.row_count, 4);
        assert_eq!(report.column_count, 3);

        let ColumnSummary::Text(region) = &report.columns[0] else {
            panic!("region should be text");
        };
        assert_eq!(region.distinct, 2);
        assert_eq!(region.top, Some(Value::Text("A".to_string())));
        assert_eq!(region.top_frequency, 2);

        let ColumnSummary::Numeric(revenue) = &report.columns[1] else {
            panic!("revenue should be numeric");
        };
        assert_eq!(revenue.count, 3);
        assert_eq!(revenue.mean, Some(200.0));
        assert_eq!(revenue.median, Some(200.0));
        assert_eq!(revenue.q25, Some(150.0));
        assert_eq!(revenue.std, Some(100.0));
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let report = correlation(&sales());
        assert_eq!(report.columns, ["revenue", "units"]);
        assert_eq!(report.matrix[0][0], Some(1.0));
        assert_eq!(report.matrix[1][1], Some(1.0));
        assert_eq!(report.matrix[0][1], report.matrix[1][0]);
        let coefficient = report.matrix[0][1].expect("defined");
        assert!((coefficient - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_column_correlates_to_sentinel() {
        let data = typed(&["a", "b"], &[&["1", "5"], &["2", "5"], &["3", "5"]]);
        let report = correlation(&data);
        assert_eq!(report.matrix[0][0], Some(1.0));
        assert_eq!(report.matrix[1][1], None);
        assert_eq!(report.matrix[0][1], None);
    }

    #[test]
    fn single_numeric_column_yields_empty_matrix() {
        let data = typed(&["name", "n"], &[&["x", "1"], &["y", "2"]]);
        let report = correlation(&data);
        assert!(report.columns.is_empty());
        assert!(report.matrix.is_empty());
    }

    #[test]
    fn missing_percentages_follow_row_count() {
        let report = missing(&sales());
        assert_eq!(report.columns[1].missing_count, 1);
        assert!((report.columns[1].missing_percent - 25.0).abs() < 1e-12);
        assert_eq!(report.total_missing, 1);
        assert!((report.total_percent - 100.0 / 12.0).abs() < 1e-9);

        let empty = missing(&typed(&["a"], &[]));
        assert!(empty.columns[0].missing_percent.abs() < f64::EPSILON);
    }

    #[test]
    fn distribution_of_all_missing_column_is_all_sentinels() {
        let data = typed(&["empty"], &[&[""], &[""]]);
        let report = distribution(&data);
        let entry = &report.columns[0];
        assert_eq!(entry.count, 0);
        assert!(entry.min.is_none());
        assert!(entry.q25.is_none());
        assert!(entry.median.is_none());
        assert!(entry.q75.is_none());
        assert!(entry.max.is_none());
        assert!(entry.mode.is_none());
    }

    #[test]
    fn sections_serialize_with_report_tag_and_null_sentinels() {
        let data = typed(&["empty"], &[&[""]]);
        let sections = build_report(&data, &[ReportKind::Distribution]);
        let json = serde_json::to_value(&sections).expect("serializable");
        assert_eq!(json[0]["report"], "distribution");
        assert!(json[0]["columns"][0]["median"].is_null());
    }
}
