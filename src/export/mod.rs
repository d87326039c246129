//! Response export pipeline
//!
//! Converts model responses (markdown), row sets and JSON values into
//! downloadable artifacts.
//!
//! ## Formats
//!
//! - `Text`: pass-through `.txt`
//! - `Csv` / `CsvWithBom`: tables extracted from the content, `.csv`
//! - `Rtf`: a Word-readable `.rtf` document
//! - `Png`: an off-screen raster of the rendered document, or of a chart
//!
//! Markdown is parsed once into a [`Document`] and every format is a
//! renderer over that model. [`Exporter`] wraps rendering with logging,
//! toasts and delivery to an [`ArtifactSink`].

mod csv_writer;
mod document;
mod page;
mod raster;
mod rtf;
mod service;
mod text;

pub use csv_writer::*;
pub use document::*;
pub use page::*;
pub use raster::*;
pub use rtf::*;
pub use service::*;
pub use text::*;

use crate::constants::DEFAULT_EXPORT_TITLE;
use crate::types::Row;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The drawing backend rejected an operation
    #[error("Rasterization failed: {0}")]
    Raster(String),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Nothing to export")]
    EmptyContent,
}

pub type ExportResult<T> = Result<T, ExportError>;

// ============================================================================
// Sources, formats and artifacts
// ============================================================================

/// Content handed to an exporter
#[derive(Clone, Debug, PartialEq)]
pub enum ExportSource {
    /// Markdown or plain text, typically a model response
    Markdown(String),
    /// Tabular rows
    Rows(Vec<Row>),
    /// An arbitrary JSON value
    Json(Value),
}

impl ExportSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ExportSource::Markdown(_) => "markdown",
            ExportSource::Rows(_) => "rows",
            ExportSource::Json(_) => "json",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ExportSource::Markdown(text) => text.trim().is_empty(),
            ExportSource::Rows(rows) => rows.is_empty(),
            ExportSource::Json(value) => value.is_null(),
        }
    }
}

impl From<&str> for ExportSource {
    fn from(text: &str) -> Self {
        ExportSource::Markdown(text.to_string())
    }
}

impl From<String> for ExportSource {
    fn from(text: String) -> Self {
        ExportSource::Markdown(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Text,
    Csv,
    /// CSV prefixed with a UTF-8 byte-order mark for spreadsheet apps
    CsvWithBom,
    Rtf,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Csv | ExportFormat::CsvWithBom => "csv",
            ExportFormat::Rtf => "rtf",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain;charset=utf-8",
            ExportFormat::Csv | ExportFormat::CsvWithBom => "text/csv;charset=utf-8",
            ExportFormat::Rtf => "application/rtf",
            ExportFormat::Png => "image/png",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Text => "Text",
            ExportFormat::Csv => "CSV",
            ExportFormat::CsvWithBom => "CSV (Excel)",
            ExportFormat::Rtf => "Word",
            ExportFormat::Png => "PNG",
        }
    }

    /// Parse a CLI-style name: `txt`, `csv`, `csv-bom`, `rtf`, `png`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "txt" | "text" => Some(ExportFormat::Text),
            "csv" => Some(ExportFormat::Csv),
            "csv-bom" | "excel" => Some(ExportFormat::CsvWithBom),
            "rtf" | "word" => Some(ExportFormat::Rtf),
            "png" | "image" => Some(ExportFormat::Png),
            _ => None,
        }
    }
}

/// Rendered bytes plus the name and MIME type to deliver them under
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}

impl ExportArtifact {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime: format.mime(),
        }
    }

    /// `data:` URL for embedding or browser download
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ============================================================================
// Filenames
// ============================================================================

/// Lowercase `title`, replacing every character outside `[a-z0-9]` with `_`.
pub fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        DEFAULT_EXPORT_TITLE.to_string()
    } else {
        sanitized
    }
}

/// `{title}_{millis}.{ext}`, or `{title}.{ext}` without a timestamp
pub fn build_filename(title: &str, extension: &str, timestamp_millis: Option<i64>) -> String {
    let title = sanitize_title(title);
    match timestamp_millis {
        Some(millis) => format!("{}_{}.{}", title, millis, extension),
        None => format!("{}.{}", title, extension),
    }
}

/// [`build_filename`] stamped with the current time
pub fn timestamped_filename(title: &str, extension: &str) -> String {
    build_filename(title, extension, Some(chrono::Utc::now().timestamp_millis()))
}
