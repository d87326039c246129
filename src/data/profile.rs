//! Structure inference and validation
//!
//! Column descriptors are derived from a sample of the first
//! [`SAMPLE_SIZE`] rows, so uniqueness and nullability on larger datasets
//! describe the sample rather than the whole file. Validation and duplicate
//! detection always scan every row.

use crate::constants::{LARGE_DATASET_ROWS, SAMPLE_SIZE, TYPE_INFERENCE_THRESHOLD};
use crate::perf::ScopedTimer;
use crate::types::{CellKey, ColumnDescriptor, ColumnType, DataCell, Row, ValidationResult};
use indexmap::IndexSet;
use std::collections::HashSet;

/// Infer a descriptor for every column seen in the sample.
///
/// Columns are the union of keys across the sampled rows, in first-seen
/// order. A column that only appears after the sample is not reported.
pub fn analyze_structure(rows: &[Row]) -> Vec<ColumnDescriptor> {
    let _timer = ScopedTimer::with_default_threshold("analyze_structure");
    let sample = &rows[..rows.len().min(SAMPLE_SIZE)];

    let mut names: IndexSet<&str> = IndexSet::new();
    for row in sample {
        names.extend(row.keys());
    }

    names
        .into_iter()
        .map(|name| describe_column(sample, name))
        .collect()
}

fn describe_column(sample: &[Row], name: &str) -> ColumnDescriptor {
    let values: Vec<&DataCell> = sample
        .iter()
        .map(|row| row.cell(name))
        .filter(|cell| !cell.is_empty())
        .collect();

    let nullable = values.len() < sample.len();
    let distinct: HashSet<CellKey> = values.iter().map(|c| c.key()).collect();

    ColumnDescriptor {
        name: name.to_string(),
        inferred_type: infer_column_type(&values),
        nullable,
        unique: distinct.len() == values.len(),
    }
}

/// Classify non-empty values: boolean, then number, then date, else string.
///
/// A type wins when at least 80% of the values parse as it.
pub fn infer_column_type(values: &[&DataCell]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::String;
    }

    let meets_threshold = |matching: usize| {
        matching as f64 / values.len() as f64 >= TYPE_INFERENCE_THRESHOLD
    };

    if meets_threshold(values.iter().filter(|c| c.is_boolean_like()).count()) {
        ColumnType::Boolean
    } else if meets_threshold(values.iter().filter(|c| c.as_number().is_some()).count()) {
        ColumnType::Number
    } else if meets_threshold(values.iter().filter(|c| c.as_date().is_some()).count()) {
        ColumnType::Date
    } else {
        ColumnType::String
    }
}

/// Validate structural consistency, and the schema when one is supplied.
pub fn validate_data(rows: &[Row], columns: Option<&[ColumnDescriptor]>) -> ValidationResult {
    let mut result = ValidationResult {
        is_valid: true,
        ..Default::default()
    };

    let Some(first) = rows.first() else {
        result.is_valid = false;
        result.errors.push("Dataset is empty".to_string());
        return result;
    };

    let expected: HashSet<&str> = first.keys().collect();
    let inconsistent = rows
        .iter()
        .filter(|row| row.keys().collect::<HashSet<_>>() != expected)
        .count();
    if inconsistent > 0 {
        tracing::warn!(inconsistent, "Rows with differing column sets");
        result.warnings.push(format!(
            "Inconsistent column structure detected in {} row(s)",
            inconsistent
        ));
    }

    for column in columns.unwrap_or_default() {
        let cells = rows.iter().map(|row| row.cell(&column.name));

        if !column.nullable {
            let nulls = cells.clone().filter(|c| c.is_empty()).count();
            if nulls > 0 {
                result.is_valid = false;
                result.errors.push(format!(
                    "Column '{}' contains {} null value(s) but is marked as non-nullable",
                    column.name, nulls
                ));
            }
        }

        if column.unique {
            let mut seen = HashSet::new();
            let duplicates = cells
                .filter(|c| !c.is_empty())
                .filter(|c| !seen.insert(c.key()))
                .count();
            if duplicates > 0 {
                result.is_valid = false;
                result.errors.push(format!(
                    "Column '{}' should be unique but contains {} duplicate value(s)",
                    column.name, duplicates
                ));
            }
        }
    }

    if rows.len() > LARGE_DATASET_ROWS {
        result.suggestions.push(format!(
            "Large dataset detected ({} rows). Consider using pagination or filtering for better performance.",
            rows.len()
        ));
    }

    let duplicates = find_duplicate_rows(rows);
    if !duplicates.is_empty() {
        result.suggestions.push(format!(
            "Found {} duplicate row(s). Consider removing duplicates.",
            duplicates.len()
        ));
    }

    result
}

/// Indices of rows that repeat an earlier row exactly.
///
/// Rows are compared by their JSON text, so key order is significant.
pub fn find_duplicate_rows(rows: &[Row]) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !seen.insert(row.to_json_string()))
        .map(|(i, _)| i)
        .collect()
}
