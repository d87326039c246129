//! Error types for data operations
//!
//! Provides unified error handling for loading, profiling, aggregation and
//! chart generation.

use thiserror::Error;

/// Errors that can occur during data operations
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text, e.g. a quote that is never closed
    #[error("CSV parse error on line {line}: {message}")]
    Csv { line: usize, message: String },

    /// JSON parsing error from serde_json
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File is too large for eager loading
    #[error("File too large: {size_mb}MB (max {max_mb}MB)")]
    TooLarge { size_mb: u64, max_mb: usize },

    /// Too many rows for eager loading
    #[error("Too many rows: {rows} (max {max_rows})")]
    TooManyRows { rows: usize, max_rows: usize },

    /// File is empty
    #[error("Empty file")]
    EmptyFile,

    /// No columns found in data
    #[error("No columns found")]
    NoColumns,

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A referenced column does not exist in any row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A chart type was requested without an axis it needs
    #[error("{chart} chart requires the {axis} axis")]
    MissingAxis { chart: &'static str, axis: &'static str },

    /// File extension is not one of csv/txt/json
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;
