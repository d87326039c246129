//! Unit tests for structure inference and validation on parsed files.

use crate::helpers::{TestRowsBuilder, sales_rows};
use datachat::data::{aggregate, analyze_structure, find_duplicate_rows, infer_column_type, validate_data};
use datachat::types::{AggregationType, ColumnType, DataCell};

#[test]
fn test_sales_fixture_structure() {
    let columns = analyze_structure(&sales_rows());
    let summary: Vec<(&str, ColumnType, bool)> = columns
        .iter()
        .map(|c| (c.name.as_str(), c.inferred_type, c.nullable))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("region", ColumnType::String, false),
            ("month", ColumnType::Date, false),
            ("units", ColumnType::Number, true),
            ("price", ColumnType::Number, false),
            ("shipped", ColumnType::Boolean, false),
            ("note", ColumnType::String, true),
        ]
    );
    assert!(columns[1].unique);
    assert!(!columns[3].unique);
}

#[test]
fn test_adding_matching_values_keeps_type() {
    let mut cells: Vec<DataCell> = (0..8).map(|i| DataCell::from(i * 3 + 2)).collect();
    cells.push(DataCell::from("n/a"));
    cells.push(DataCell::from("pending"));

    for extra in 0..20 {
        let refs: Vec<&DataCell> = cells.iter().collect();
        assert_eq!(infer_column_type(&refs), ColumnType::Number, "after {} extra", extra);
        cells.push(DataCell::from(extra * 7 + 2));
    }
}

#[test]
fn test_schema_violations_invalidate() {
    let rows = sales_rows();
    let mut columns = analyze_structure(&rows);
    // Claim units is required and price unique; neither holds
    columns[2].nullable = false;
    columns[3].unique = true;

    let result = validate_data(&rows, Some(&columns));
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].contains("'units'"));
    assert!(result.errors[1].contains("'price'"));
}

#[test]
fn test_empty_dataset_validation() {
    let result = validate_data(&[], None);
    assert!(!result.is_valid);
    assert_eq!(result.errors, vec!["Dataset is empty"]);
    assert!(result.warnings.is_empty());
    assert!(result.suggestions.is_empty());
}

#[test]
fn test_duplicates_reported_after_first() {
    let rows = TestRowsBuilder::new(&["a"])
        .typed_row(vec![DataCell::from(1)])
        .typed_row(vec![DataCell::from(2)])
        .typed_row(vec![DataCell::from(1)])
        .build();
    assert_eq!(find_duplicate_rows(&rows), vec![2]);
    assert_eq!(validate_data(&rows, None).suggestions.len(), 1);
}

#[test]
fn test_aggregation_over_parsed_text() {
    let rows = aggregate(
        &sales_rows(),
        "region",
        &[
            ("units".to_string(), AggregationType::Sum),
            ("units".to_string(), AggregationType::Count),
            ("note".to_string(), AggregationType::Min),
            ("note".to_string(), AggregationType::Avg),
        ],
    )
    .unwrap();

    let regions: Vec<String> = rows.iter().map(|r| r.cell("region").to_string()).collect();
    assert_eq!(regions, vec!["north", "south", "east", "west"]);

    let south = &rows[1];
    assert_eq!(south.cell("units_sum"), &DataCell::Number(7.0));
    assert_eq!(south.cell("units_count"), &DataCell::Number(1.0));
    // No numeric notes: min is null while avg falls back to zero
    assert_eq!(south.cell("note_min"), &DataCell::Empty);
    assert_eq!(south.cell("note_avg"), &DataCell::Number(0.0));
}
