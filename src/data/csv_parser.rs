//! CSV and TXT file parsing
//!
//! Parses delimited text into a [`Dataset`] of text cells. Types are not
//! assigned here; profiling infers them later from a sample.
//!
//! ## Memory Limits
//!
//! To prevent unbounded memory growth:
//! - Files larger than 100MB are rejected (see [`MAX_CSV_SIZE_MB`])
//! - Files with more than 100,000 rows are rejected (see [`MAX_CSV_ROWS`])

use crate::constants::{MAX_CSV_ROWS, MAX_CSV_SIZE_MB};
use crate::data::error::{DataError, DataResult};
use crate::types::{DataCell, DataOrigin, Dataset, Row};
use std::path::Path;

/// Parse a CSV or TXT file into a Dataset
///
/// The delimiter is detected from content (whichever of comma, tab or
/// semicolon appears most in the first lines; comma wins ties).
///
/// # Memory Limits
/// - Files larger than [`MAX_CSV_SIZE_MB`]MB will return [`DataError::TooLarge`]
/// - Files with more than [`MAX_CSV_ROWS`] rows will return [`DataError::TooManyRows`]
pub fn parse_csv_file(path: &Path) -> DataResult<Dataset> {
    // Check file size before reading
    let metadata = std::fs::metadata(path)?;
    let size_mb = metadata.len() / (1024 * 1024);
    if size_mb > MAX_CSV_SIZE_MB as u64 {
        return Err(DataError::TooLarge {
            size_mb,
            max_mb: MAX_CSV_SIZE_MB,
        });
    }

    let content = std::fs::read_to_string(path)?;
    let delimiter = detect_delimiter(&content);
    let mut dataset = parse_csv_content(&content, delimiter)?;

    dataset.name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Data")
        .to_string();
    dataset.origin = DataOrigin::Csv {
        path: path.to_path_buf(),
    };
    Ok(dataset)
}

/// Parse delimited content from a string
///
/// The first non-blank line is the header. Short rows are padded with empty
/// cells; fields beyond the header are dropped.
pub fn parse_csv_content(content: &str, delimiter: char) -> DataResult<Dataset> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    // Parse header row
    let (header_index, header_line) = lines.next().ok_or(DataError::EmptyFile)?;
    let headers: Vec<String> = split_record(header_line, delimiter, header_index + 1)?;

    if headers.iter().all(|h| h.is_empty()) {
        return Err(DataError::NoColumns);
    }

    // Parse data rows with limit
    let mut rows: Vec<Row> = Vec::new();
    for (index, line) in lines {
        if rows.len() >= MAX_CSV_ROWS {
            return Err(DataError::TooManyRows {
                rows: rows.len() + 1, // +1 for the current row that exceeded limit
                max_rows: MAX_CSV_ROWS,
            });
        }
        let mut fields = split_record(line, delimiter, index + 1)?.into_iter();
        let row: Row = headers
            .iter()
            .map(|header| {
                let cell = match fields.next() {
                    Some(value) if !value.is_empty() => DataCell::Text(value),
                    _ => DataCell::Empty,
                };
                (header.clone(), cell)
            })
            .collect();
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), columns = headers.len(), "Parsed CSV content");
    Ok(Dataset::new("Data", rows))
}

/// Detect the delimiter to use for parsing
pub fn detect_delimiter(content: &str) -> char {
    // Count delimiters in first few lines to determine most likely
    let first_lines: String = content.lines().take(5).collect::<Vec<_>>().join("\n");

    let comma_count = first_lines.matches(',').count();
    let tab_count = first_lines.matches('\t').count();
    let semicolon_count = first_lines.matches(';').count();

    if tab_count > comma_count && tab_count > semicolon_count {
        '\t'
    } else if semicolon_count > comma_count {
        ';'
    } else {
        ','
    }
}

/// Split one record of a file, rejecting a quote that is never closed.
fn split_record(line: &str, delimiter: char, line_number: usize) -> DataResult<Vec<String>> {
    match split_fields(line, delimiter) {
        (fields, false) => Ok(fields),
        (_, true) => Err(DataError::Csv {
            line: line_number,
            message: "unterminated quoted field".to_string(),
        }),
    }
}

/// Split a CSV line respecting quoted fields
///
/// Fields are trimmed; a quoted field keeps delimiters verbatim and `""`
/// inside quotes becomes a single quote. Also reports whether the line
/// ended inside an open quote.
fn split_fields(line: &str, delimiter: char) -> (Vec<String>, bool) {
    let mut result = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' if in_quotes => in_quotes = false,
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                was_quoted = true;
            }
            c if c == delimiter && !in_quotes => {
                result.push(finish_field(&mut field, was_quoted));
                was_quoted = false;
            }
            c => field.push(c),
        }
    }

    // Add the last field
    result.push(finish_field(&mut field, was_quoted));
    (result, in_quotes)
}

fn finish_field(field: &mut String, was_quoted: bool) -> String {
    let value = if was_quoted {
        // Whitespace inside quotes is content; only trailing junk after the
        // closing quote is trimmed
        field.trim_end().to_string()
    } else {
        field.trim().to_string()
    };
    field.clear();
    value
}

/// Check if a file path is a data file (CSV/TXT/JSON)
pub fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "csv" | "txt" | "json"))
        .unwrap_or(false)
}
