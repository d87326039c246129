//! Group-by aggregation
//!
//! Rows are grouped on the raw cell of one column and each requested column
//! is reduced with an [`AggregationType`]. Non-numeric and empty values are
//! dropped before reduction.
//!
//! On an empty numeric set `sum`, `avg` and `count` yield `0` while `min`
//! and `max` yield null.

use crate::data::error::{DataError, DataResult};
use crate::types::{AggregationType, CellKey, DataCell, Row};
use indexmap::IndexMap;

/// Group `rows` by `group_by` and apply each `(column, operation)` pair.
///
/// Output has one row per group in first-seen order, holding the group key
/// under `group_by` and each result under `<column>_<op>`.
pub fn aggregate(
    rows: &[Row],
    group_by: &str,
    aggregations: &[(String, AggregationType)],
) -> DataResult<Vec<Row>> {
    if aggregations.is_empty() {
        return Err(DataError::InvalidData(
            "At least one aggregation is required".to_string(),
        ));
    }
    if !rows.is_empty() && !rows.iter().any(|row| row.contains_key(group_by)) {
        tracing::error!(column = group_by, "Aggregation failed: unknown group column");
        return Err(DataError::ColumnNotFound(group_by.to_string()));
    }

    let mut groups: IndexMap<CellKey, (DataCell, Vec<&Row>)> = IndexMap::new();
    for row in rows {
        let cell = row.cell(group_by);
        groups
            .entry(cell.key())
            .or_insert_with(|| (cell.clone(), Vec::new()))
            .1
            .push(row);
    }

    let result: Vec<Row> = groups
        .into_values()
        .map(|(key, members)| {
            let mut out = Row::new().with(group_by, key);
            for (column, op) in aggregations {
                let values: Vec<f64> = members
                    .iter()
                    .filter_map(|row| row.cell(column).as_number())
                    .collect();
                out.insert(format!("{}_{}", column, op.suffix()), apply(*op, &values));
            }
            out
        })
        .collect();

    tracing::debug!(groups = result.len(), column = group_by, "Aggregated rows");
    Ok(result)
}

/// Reduce already-parsed numbers with `op`.
pub fn apply(op: AggregationType, values: &[f64]) -> DataCell {
    match op {
        AggregationType::Sum => DataCell::Number(values.iter().sum()),
        AggregationType::Avg => {
            if values.is_empty() {
                DataCell::Number(0.0)
            } else {
                DataCell::Number(values.iter().sum::<f64>() / values.len() as f64)
            }
        }
        AggregationType::Count => DataCell::Number(values.len() as f64),
        AggregationType::Min => values.iter().copied().reduce(f64::min).into(),
        AggregationType::Max => values.iter().copied().reduce(f64::max).into(),
    }
}
