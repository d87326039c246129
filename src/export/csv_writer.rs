//! CSV export
//!
//! ## Sources
//!
//! - Markdown: every table becomes a block of CSV records, tables separated
//!   by one blank line. Content with no table is exported as a single
//!   `Content` column holding one text block per record.
//! - Rows: header from the keys of the first row, empty values written as
//!   the `—` placeholder.
//! - JSON: arrays of objects are exported as rows, anything else as text.

use super::document::Document;
use super::text::render_text;
use super::{ExportError, ExportResult, ExportSource};
use crate::constants::{EMPTY_PLACEHOLDER, UTF8_BOM};
use crate::types::{DataCell, Row};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^\s*\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)+\|?\s*$")
        .expect("Hard-coded regex pattern should be valid")
});

static HTML_TABLE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)<(table|th|td)\b").expect("Hard-coded regex pattern should be valid")
});

/// True when `content` looks tabular: a markdown table, an HTML table, or
/// a line with more than two comma-separated fields.
pub fn detect_table_data(content: &str) -> bool {
    let lines: Vec<&str> = content.lines().collect();

    let markdown = lines
        .windows(2)
        .any(|pair| pair[0].contains('|') && TABLE_SEPARATOR.is_match(pair[1]));

    markdown
        || HTML_TABLE.is_match(content)
        || lines.iter().any(|line| line.split(',').count() > 2)
}

/// Quote a field containing a comma, quote, CR or LF; inner quotes are doubled.
pub fn quote_csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Display text of a cell, with empty values replaced by the placeholder
pub fn safe_fallback(cell: &DataCell) -> String {
    if cell.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        cell.to_string()
    }
}

fn record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Rows as CSV, with the header taken from the first row's keys.
pub fn rows_to_csv(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let header: Vec<&str> = first.keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(record(&header));
    for row in rows {
        let values: Vec<String> = header.iter().map(|h| safe_fallback(row.cell(h))).collect();
        lines.push(record(&values));
    }
    lines.join("\n")
}

/// Markdown as CSV: all tables, or a `Content` column when there are none.
pub fn markdown_to_csv(markdown: &str) -> String {
    let doc = Document::parse(markdown);
    let tables = doc.tables();

    if tables.is_empty() {
        let mut lines = vec!["Content".to_string()];
        lines.extend(doc.text_blocks().iter().map(|block| quote_csv_field(block).into_owned()));
        return lines.join("\n");
    }

    tables
        .iter()
        .map(|table| {
            table
                .iter()
                .map(|row| record(row))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub(super) fn json_rows(value: &Value) -> Option<Vec<Row>> {
    let array = value.as_array()?;
    if array.is_empty() {
        return None;
    }
    array
        .iter()
        .map(|item| {
            item.as_object().map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.clone(), DataCell::from(v.clone())))
                    .collect::<Row>()
            })
        })
        .collect()
}

/// Render `source` as CSV, optionally prefixed with a UTF-8 BOM.
pub fn render_csv(source: &ExportSource, with_bom: bool) -> ExportResult<String> {
    let body = match source {
        ExportSource::Rows(rows) if rows.is_empty() => return Err(ExportError::EmptyContent),
        ExportSource::Rows(rows) => rows_to_csv(rows),
        ExportSource::Markdown(text) => markdown_to_csv(text),
        ExportSource::Json(value) => match json_rows(value) {
            Some(rows) => rows_to_csv(&rows),
            None => markdown_to_csv(&render_text(source)?),
        },
    };

    tracing::debug!(bytes = body.len(), with_bom, "Rendered CSV");
    Ok(if with_bom {
        format!("{}{}", UTF8_BOM, body)
    } else {
        body
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn test_quote_csv_field() {
        assert_eq!(quote_csv_field("plain"), "plain");
        assert_eq!(quote_csv_field("a,b"), "\"a,b\"");
        assert_eq!(quote_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_detect_table_data() {
        assert!(detect_table_data("| a | b |\n|---|---|\n| 1 | 2 |"));
        assert!(detect_table_data("<TABLE><tr><td>1</td></tr></TABLE>"));
        assert!(detect_table_data("x,y,z\n1,2,3"));
        assert!(!detect_table_data("Just a sentence, with one comma."));
        assert!(!detect_table_data("a | b without separator"));
    }

    #[test]
    fn test_rows_use_placeholder() {
        let rows = vec![
            row! { "name" => "Ann", "city" => "Paris, FR" },
            row! { "name" => "Bob", "city" => DataCell::Empty },
            row! { "name" => "Cy" },
        ];
        assert_eq!(
            rows_to_csv(&rows),
            "name,city\nAnn,\"Paris, FR\"\nBob,—\nCy,—"
        );
    }

    #[test]
    fn test_multiple_tables_separated() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\ntext between\n\n| c |\n|---|\n| 3 |\n";
        assert_eq!(markdown_to_csv(md), "a,b\n1,2\n\nc\n3");
    }

    #[test]
    fn test_no_table_falls_back_to_content_column() {
        let md = "# Findings\n\nSales rose, mostly in Q3.\n\n- north grew";
        assert_eq!(
            markdown_to_csv(md),
            "Content\nFindings\n\"Sales rose, mostly in Q3.\"\nnorth grew"
        );
    }

    #[test]
    fn test_bom_and_empty_rows() {
        let csv = render_csv(&ExportSource::from("| a |\n|---|\n| 1 |"), true).unwrap();
        assert!(csv.starts_with('\u{feff}'));
        assert!(matches!(
            render_csv(&ExportSource::Rows(Vec::new()), false),
            Err(ExportError::EmptyContent)
        ));
    }

    #[test]
    fn test_json_array_exports_as_rows() {
        let value = serde_json::json!([{"k": "x", "v": null}]);
        assert_eq!(render_csv(&ExportSource::Json(value), false).unwrap(), "k,v\nx,—");
    }
}
