//! Single-predicate row filtering.

use analytics_store::{ColumnKind, Dataset, FilterOperator, FilterPredicate, Value};
use tracing::debug;

use super::ValidationError;
use crate::schema::{TypedDataset, coerce_value};

/// Returns the positions of rows satisfying `predicate`, in row order.
///
/// # Errors
/// Returns `ValidationError` if the column does not exist, the operator does
/// not apply to the column's kind, or the comparison value cannot be read as
/// that kind.
pub fn matching_rows(
    data: &TypedDataset,
    predicate: &FilterPredicate,
) -> Result<Vec<usize>, ValidationError> {
    let (index, descriptor) = data
        .column(&predicate.column)
        .ok_or_else(|| ValidationError::unknown_column(&predicate.column, data.dataset.columns()))?;
    check_operator(predicate.operator, descriptor.kind, &predicate.column)?;
    let target = comparison_value(descriptor.kind, &predicate.value, &predicate.column)?;

    let matches: Vec<usize> = data
        .dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            row.get(index)
                .is_some_and(|cell| evaluate(cell, predicate.operator, &target))
        })
        .map(|(position, _)| position)
        .collect();

    debug!(
        column = %predicate.column,
        operator = %predicate.operator,
        matched = matches.len(),
        total = data.dataset.row_count(),
        "evaluated filter predicate"
    );
    Ok(matches)
}

/// Filters a typed dataset, keeping column set and row order.
///
/// # Errors
/// See [`matching_rows`].
pub fn apply(data: &TypedDataset, predicate: &FilterPredicate) -> Result<Dataset, ValidationError> {
    let rows = matching_rows(data, predicate)?;
    Ok(data.dataset.select_rows(&rows))
}

fn check_operator(
    operator: FilterOperator,
    kind: ColumnKind,
    column: &str,
) -> Result<(), ValidationError> {
    if operator.is_ordering() && !kind.is_orderable() {
        return Err(ValidationError::new(format!(
            "condition {operator} requires a numeric or temporal column; {column} is {kind}"
        )));
    }
    if operator.is_text_match() && kind != ColumnKind::Text {
        return Err(ValidationError::new(format!(
            "condition {operator} requires a text column; {column} is {kind}"
        )));
    }
    Ok(())
}

fn comparison_value(
    kind: ColumnKind,
    value: &Value,
    column: &str,
) -> Result<Value, ValidationError> {
    if value.is_missing() {
        return Err(ValidationError::new("a comparison value is required"));
    }
    let coerced = coerce_value(kind, value.clone());
    if coerced.is_missing() {
        return Err(ValidationError::new(format!(
            "value {value} cannot be compared with {kind} column {column}"
        )));
    }
    Ok(coerced)
}

// Missing cells never match, including for `NotEquals`.
fn evaluate(cell: &Value, operator: FilterOperator, target: &Value) -> bool {
    if cell.is_missing() {
        return false;
    }
    match operator {
        FilterOperator::Equals => cell == target,
        FilterOperator::NotEquals => cell != target,
        FilterOperator::GreaterThan => cell > target,
        FilterOperator::LessThan => cell < target,
        FilterOperator::GreaterOrEqual => cell >= target,
        FilterOperator::LessOrEqual => cell <= target,
        FilterOperator::Contains => text_test(cell, target, |text, needle| text.contains(needle)),
        FilterOperator::StartsWith => {
            text_test(cell, target, |text, needle| text.starts_with(needle))
        }
        FilterOperator::EndsWith => text_test(cell, target, |text, needle| text.ends_with(needle)),
    }
}

fn text_test(cell: &Value, target: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    match (cell.as_text(), target.as_text()) {
        (Some(text), Some(needle)) => test(text, needle),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> TypedDataset {
        let cell = |raw: &str| {
            if raw.is_empty() {
                Value::Missing
            } else {
                Value::Text(raw.to_string())
            }
        };
        let rows = [("A", "100"), ("B", "200"), ("A", "300"), ("B", "")]
            .iter()
            .map(|(region, revenue)| vec![cell(region), cell(revenue)])
            .collect();
        let dataset = Dataset::new(vec!["region".to_string(), "revenue".to_string()], rows)
            .expect("valid dataset");
        TypedDataset::from_dataset(dataset)
    }

    fn predicate(column: &str, operator: FilterOperator, value: Value) -> FilterPredicate {
        FilterPredicate {
            column: column.to_string(),
            operator,
            value,
        }
    }

    #[test]
    fn equals_on_text_keeps_matching_rows() {
        let data = sales();
        let filtered = apply(
            &data,
            &predicate("region", FilterOperator::Equals, Value::Text("A".to_string())),
        )
        .expect("filter succeeds");
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.columns(), data.dataset.columns());
    }

    #[test]
    fn greater_than_skips_missing_values() {
        let data = sales();
        let rows = matching_rows(
            &data,
            &predicate("revenue", FilterOperator::GreaterThan, Value::Number(150.0)),
        )
        .expect("filter succeeds");
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn string_comparison_value_is_coerced_to_number() {
        let data = sales();
        let rows = matching_rows(
            &data,
            &predicate(
                "revenue",
                FilterOperator::LessOrEqual,
                Value::Text("200".to_string()),
            ),
        )
        .expect("filter succeeds");
        assert_eq!(rows, vec![0, 1]);
    }

    #[test]
    fn not_equals_never_matches_missing() {
        let data = sales();
        let rows = matching_rows(
            &data,
            &predicate("revenue", FilterOperator::NotEquals, Value::Number(100.0)),
        )
        .expect("filter succeeds");
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn text_operators_are_case_sensitive() {
        let data = sales();
        let rows = matching_rows(
            &data,
            &predicate("region", FilterOperator::Contains, Value::Text("a".to_string())),
        )
        .expect("filter succeeds");
        assert!(rows.is_empty());
    }

    #[test]
    fn ordering_operator_on_text_column_is_rejected() {
        let err = matching_rows(
            &sales(),
            &predicate("region", FilterOperator::GreaterThan, Value::Number(1.0)),
        )
        .expect_err("must be rejected");
        assert!(err.message().contains("numeric or temporal"));
    }

    #[test]
    fn text_operator_on_numeric_column_is_rejected() {
        let err = matching_rows(
            &sales(),
            &predicate("revenue", FilterOperator::StartsWith, Value::Text("1".to_string())),
        )
        .expect_err("must be rejected");
        assert!(err.message().contains("requires a text column"));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = matching_rows(
            &sales(),
            &predicate("profit", FilterOperator::Equals, Value::Number(1.0)),
        )
        .expect_err("must be rejected");
        assert!(err.message().starts_with("unknown column: profit"));
    }

    #[test]
    fn unparseable_comparison_value_is_rejected() {
        let err = matching_rows(
            &sales(),
            &predicate("revenue", FilterOperator::Equals, Value::Text("lots".to_string())),
        )
        .expect_err("must be rejected");
        assert!(err.message().contains("cannot be compared"));
    }

    #[test]
    fn every_kept_row_satisfies_and_every_dropped_row_fails() {
        let data = sales();
        let target = Value::Number(200.0);
        let kept = matching_rows(
            &data,
            &predicate("revenue", FilterOperator::GreaterOrEqual, target.clone()),
        )
        .expect("filter succeeds");
        for (position, row) in data.dataset.rows().iter().enumerate() {
            let satisfies = !row[1].is_missing() && row[1] >= target;
            assert_eq!(kept.contains(&position), satisfies, "row {position}");
        }
    }
}
