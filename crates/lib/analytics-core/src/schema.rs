//! Schema inspection: explicit, deterministic column type inference.
//!
//! A column is boolean, temporal or numeric only when every non-missing cell
//! qualifies for that kind, checked in that order of specificity. Any cell
//! that fails all three demotes the whole column to text. A column with no
//! values at all is treated as an empty numeric column.

use std::collections::HashSet;

use analytics_store::schema::{parse_bool_token, parse_number, parse_temporal};
use analytics_store::{ColumnDescriptor, ColumnKind, Dataset, Value};

/// A dataset whose cells have been coerced to their inferred column kinds.
#[derive(Debug, Clone)]
pub struct TypedDataset {
    pub dataset: Dataset,
    pub descriptors: Vec<ColumnDescriptor>,
}

impl TypedDataset {
    /// Infers column kinds and coerces every cell.
    #[must_use]
    pub fn from_dataset(dataset: Dataset) -> Self {
        let descriptors = inspect(&dataset);
        let dataset = coerce(dataset, &descriptors);
        Self {
            dataset,
            descriptors,
        }
    }

    /// Looks up a column by name, returning its position and descriptor.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<(usize, &ColumnDescriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .find(|(_, descriptor)| descriptor.name == name)
    }

    /// Positions of columns of the given kind, in column order.
    #[must_use]
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<usize> {
        self.descriptors
            .iter()
            .enumerate()
            .filter(|(_, descriptor)| descriptor.kind == kind)
            .map(|(index, _)| index)
            .collect()
    }
}

/// Derives one descriptor per column. A dataset without columns yields none.
#[must_use]
pub fn inspect(dataset: &Dataset) -> Vec<ColumnDescriptor> {
    dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let kind = infer_kind(dataset.column_values(index));
            let mut missing_count = 0;
            let mut distinct = HashSet::new();
            for value in dataset.column_values(index) {
                if value.is_missing() {
                    missing_count += 1;
                } else {
                    distinct.insert(coerce_value(kind, value.clone()));
                }
            }
            ColumnDescriptor {
                name: name.clone(),
                kind,
                missing_count,
                distinct_count: distinct.len(),
            }
        })
        .collect()
}

/// Applies the inference rule to one column's cells.
pub fn infer_kind<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut any_present = false;
    let mut boolean = true;
    let mut temporal = true;
    let mut numeric = true;

    for value in values {
        let (is_bool, is_temporal, is_numeric) = match value {
            Value::Missing => continue,
            Value::Boolean(_) => (true, false, false),
            Value::Temporal(_) => (false, true, false),
            Value::Number(_) => (false, false, true),
            Value::Text(raw) => (
                parse_bool_token(raw).is_some(),
                parse_temporal(raw).is_some(),
                parse_number(raw).is_some(),
            ),
        };
        any_present = true;
        boolean &= is_bool;
        temporal &= is_temporal;
        numeric &= is_numeric;
        if !(boolean || temporal || numeric) {
            return ColumnKind::Text;
        }
    }

    if !any_present {
        ColumnKind::Numeric
    } else if boolean {
        ColumnKind::Boolean
    } else if temporal {
        ColumnKind::Temporal
    } else if numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

/// Converts every cell to the kind recorded in `descriptors`.
#[must_use]
pub fn coerce(dataset: Dataset, descriptors: &[ColumnDescriptor]) -> Dataset {
    dataset.map_cells(|index, value| match descriptors.get(index) {
        Some(descriptor) => coerce_value(descriptor.kind, value),
        None => value,
    })
}

/// Converts one cell to `kind`. Cells that do not parse become missing.
#[must_use]
pub fn coerce_value(kind: ColumnKind, value: Value) -> Value {
    match (kind, value) {
        (_, Value::Missing) => Value::Missing,
        (ColumnKind::Text, Value::Text(raw)) => Value::Text(raw),
        (ColumnKind::Text, other) => Value::Text(other.to_string()),
        (ColumnKind::Numeric, Value::Text(raw)) => {
            parse_number(&raw).map_or(Value::Missing, Value::Number)
        }
        (ColumnKind::Boolean, Value::Text(raw)) => {
            parse_bool_token(&raw).map_or(Value::Missing, Value::Boolean)
        }
        (ColumnKind::Temporal, Value::Text(raw)) => {
            parse_temporal(&raw).map_or(Value::Missing, Value::Temporal)
        }
        (ColumnKind::Numeric, value @ Value::Number(_))
        | (ColumnKind::Boolean, value @ Value::Boolean(_))
        | (ColumnKind::Temporal, value @ Value::Temporal(_)) => value,
        (_, _) => Value::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<Value> {
        values
            .iter()
            .map(|value| {
                if value.is_empty() {
                    Value::Missing
                } else {
                    Value::Text((*value).to_string())
                }
            })
            .collect()
    }

    #[test]
    fn numeric_column_ignores_missing() {
        assert_eq!(infer_kind(&texts(&["1", "", "2.5"])), ColumnKind::Numeric);
    }

    #[test]
    fn one_bad_value_demotes_to_text() {
        assert_eq!(infer_kind(&texts(&["1", "2", "three"])), ColumnKind::Text);
        assert_eq!(infer_kind(&texts(&["true", "false", "1"])), ColumnKind::Text);
    }

    #[test]
    fn specific_kinds_win_when_all_values_qualify() {
        assert_eq!(infer_kind(&texts(&["true", "False"])), ColumnKind::Boolean);
        assert_eq!(
            infer_kind(&texts(&["2024-01-01", "2024-02-01 10:00:00"])),
            ColumnKind::Temporal
        );
    }

    #[test]
    fn all_missing_column_is_numeric() {
        assert_eq!(infer_kind(&texts(&["", ""])), ColumnKind::Numeric);
    }

    #[test]
    fn inspect_counts_missing_and_distinct() {
        let dataset = Dataset::new(
            vec!["region".to_string(), "revenue".to_string()],
            vec![
                texts(&["A", "100"]),
                texts(&["B", "200"]),
                texts(&["A", "100.0"]),
                texts(&["B", ""]),
            ],
        )
        .expect("valid dataset");

        let descriptors = inspect(&dataset);
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].kind, ColumnKind::Text);
        assert_eq!(descriptors[0].distinct_count, 2);
        assert_eq!(descriptors[1].kind, ColumnKind::Numeric);
        assert_eq!(descriptors[1].missing_count, 1);
        assert_eq!(descriptors[1].distinct_count, 2);
    }

    #[test]
    fn empty_dataset_has_no_descriptors() {
        let dataset = Dataset::new(Vec::new(), Vec::new()).expect("empty dataset");
        assert!(inspect(&dataset).is_empty());
    }

    #[test]
    fn coerce_is_idempotent() {
        let dataset = Dataset::new(vec!["n".to_string()], vec![texts(&["3"]), texts(&[""])])
            .expect("valid dataset");
        let typed = TypedDataset::from_dataset(dataset);
        assert_eq!(typed.dataset.rows()[0][0], Value::Number(3.0));

        let again = TypedDataset::from_dataset(typed.dataset.clone());
        assert_eq!(again.dataset, typed.dataset);
        assert_eq!(again.descriptors, typed.descriptors);
    }
}
