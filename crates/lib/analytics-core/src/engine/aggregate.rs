//! Group-by aggregation.

use std::collections::HashMap;

use analytics_store::schema::make_aggregate_column;
use analytics_store::{AggregateFunction, AggregationSpec, ColumnKind, Dataset, Value};
use tracing::debug;

use super::{ValidationError, stats};
use crate::schema::TypedDataset;

/// Rows sharing one group key, in first-seen order of the key.
struct Group {
    key: Value,
    rows: Vec<usize>,
}

/// Groups rows by `spec.group_by` and computes every requested
/// `(value column, function)` pair per group.
///
/// The output has the group column first, then one `<column>_<function>`
/// column per pair. Rows with a missing key belong to no group.
///
/// # Errors
/// Returns `ValidationError` for empty column or function lists, unknown
/// columns, or a numeric function over a non-numeric column.
pub fn aggregate(data: &TypedDataset, spec: &AggregationSpec) -> Result<Dataset, ValidationError> {
    let columns = data.dataset.columns();
    let (key_index, key_descriptor) = data
        .column(&spec.group_by)
        .ok_or_else(|| ValidationError::unknown_column(&spec.group_by, columns))?;

    let value_columns = dedup(&spec.value_columns);
    let functions = dedup(&spec.functions);
    if value_columns.is_empty() {
        return Err(ValidationError::new("at least one value column is required"));
    }
    if functions.is_empty() {
        return Err(ValidationError::new(
            "at least one aggregation function is required",
        ));
    }

    let mut targets = Vec::with_capacity(value_columns.len());
    for name in &value_columns {
        let (index, descriptor) = data
            .column(name)
            .ok_or_else(|| ValidationError::unknown_column(name, columns))?;
        if descriptor.kind != ColumnKind::Numeric
            && let Some(function) = functions.iter().find(|function| function.requires_numeric())
        {
            return Err(ValidationError::new(format!(
                "function {function} requires a numeric column; {name} is {}",
                descriptor.kind
            )));
        }
        targets.push((name.as_str(), index));
    }

    let mut groups = collect_groups(&data.dataset, key_index);
    if key_descriptor.kind.is_orderable() {
        groups.sort_by(|left, right| left.key.cmp(&right.key));
    }

    let mut output_columns = vec![spec.group_by.clone()];
    for (name, _) in &targets {
        for function in &functions {
            output_columns.push(make_aggregate_column(name, function.as_str()));
        }
    }

    let rows = groups
        .iter()
        .map(|group| {
            let mut row = Vec::with_capacity(output_columns.len());
            row.push(group.key.clone());
            for (_, index) in &targets {
                for function in &functions {
                    row.push(compute(&data.dataset, &group.rows, *index, *function));
                }
            }
            row
        })
        .collect();

    debug!(
        group_by = %spec.group_by,
        groups = groups.len(),
        columns = output_columns.len(),
        "aggregated dataset"
    );
    Dataset::new(output_columns, rows).map_err(|err| ValidationError::new(err.to_string()))
}

fn dedup<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique
}

fn collect_groups(dataset: &Dataset, key_index: usize) -> Vec<Group> {
    let mut positions: HashMap<&Value, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    for (row_index, row) in dataset.rows().iter().enumerate() {
        let Some(key) = row.get(key_index).filter(|key| !key.is_missing()) else {
            continue;
        };
        if let Some(&position) = positions.get(key) {
            groups[position].rows.push(row_index);
        } else {
            positions.insert(key, groups.len());
            groups.push(Group {
                key: key.clone(),
                rows: vec![row_index],
            });
        }
    }
    groups
}

fn compute(dataset: &Dataset, rows: &[usize], column: usize, function: AggregateFunction) -> Value {
    let cells = rows
        .iter()
        .filter_map(|row| dataset.rows().get(*row).and_then(|cells| cells.get(column)))
        .filter(|cell| !cell.is_missing());

    if function == AggregateFunction::Count {
        #[allow(clippy::cast_precision_loss)]
        return Value::Number(cells.count() as f64);
    }

    let values: Vec<f64> = cells.filter_map(Value::as_f64).collect();
    let result = match function {
        AggregateFunction::Sum => Some(stats::sum(&values)),
        AggregateFunction::Mean => stats::mean(&values),
        AggregateFunction::Min => stats::min(&values),
        AggregateFunction::Max => stats::max(&values),
        AggregateFunction::Median => stats::median(&values),
        AggregateFunction::Count => None,
    };
    result.map_or(Value::Missing, Value::Number)
}
