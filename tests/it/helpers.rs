//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `TestRowsBuilder` - Builder pattern for rows sharing a column layout
//! - `sales_rows()` / `SALES_CSV` - A small mixed-type fixture
//! - `write_file()` - Drop content into a temp directory

#![allow(dead_code)]

use datachat::types::{DataCell, Row};
use std::path::{Path, PathBuf};

/// Region, month, units and an optional note for eight orders.
pub const SALES_CSV: &str = "\
region,month,units,price,shipped,note
north,2024-01-15,12,9.5,true,
south,2024-01-20,7,12.0,false,late
north,2024-02-03,3,9.5,true,
east,2024-02-10,20,8.25,yes,\"bulk, priority\"
south,2024-03-01,,12.0,no,
west,2024-03-12,5,15.0,true,
north,2024-03-19,9,9.5,false,
east,2024-04-02,14,8.25,true,
";

/// Builder for rows with a fixed column order.
///
/// # Example
/// ```ignore
/// let rows = TestRowsBuilder::new(&["name", "score"])
///     .row(["Ann", "3"])
///     .row(["Bob", ""])
///     .build();
/// ```
pub struct TestRowsBuilder {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TestRowsBuilder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a row of text cells; empty strings become empty cells.
    pub fn row<const N: usize>(mut self, values: [&str; N]) -> Self {
        let row = self
            .columns
            .iter()
            .zip(values)
            .map(|(column, value)| {
                let cell = if value.is_empty() {
                    DataCell::Empty
                } else {
                    DataCell::from(value)
                };
                (column.clone(), cell)
            })
            .collect();
        self.rows.push(row);
        self
    }

    /// Add a row of already-typed cells.
    pub fn typed_row(mut self, values: Vec<DataCell>) -> Self {
        let row = self.columns.iter().cloned().zip(values).collect();
        self.rows.push(row);
        self
    }

    pub fn build(self) -> Vec<Row> {
        self.rows
    }
}

/// The `SALES_CSV` fixture parsed into rows.
pub fn sales_rows() -> Vec<Row> {
    datachat::data::parse_csv_content(SALES_CSV, ',')
        .expect("fixture parses")
        .rows
}

/// Write `content` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}
