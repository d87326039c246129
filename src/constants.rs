//! Application-wide constants.
//!
//! Centralizes magic numbers used by profiling, charting and export to make
//! the codebase more maintainable and self-documenting.

// ============================================================================
// Data Loading
// ============================================================================

/// Maximum CSV/JSON file size for eager loading, in megabytes
pub const MAX_CSV_SIZE_MB: usize = 100;

/// Maximum number of data rows accepted from a single file
pub const MAX_CSV_ROWS: usize = 100_000;

// ============================================================================
// Profiling
// ============================================================================

/// Number of leading rows used for structure inference
pub const SAMPLE_SIZE: usize = 100;

/// Share of non-empty sampled values that must parse as a type to claim it
pub const TYPE_INFERENCE_THRESHOLD: f64 = 0.8;

/// Row count above which validation suggests pagination
pub const LARGE_DATASET_ROWS: usize = 10_000;

/// Tokens accepted as boolean literals (compared case-insensitively)
pub const BOOLEAN_LITERALS: [&str; 6] = ["true", "false", "1", "0", "yes", "no"];

// ============================================================================
// Charts
// ============================================================================

/// Upper bound on histogram bins
pub const MAX_HISTOGRAM_BINS: usize = 20;

/// Distinct x values at or below which a pie chart is suggested
pub const PIE_MAX_CATEGORIES: usize = 10;

/// Distinct x values above which two numeric columns suggest a scatter plot
pub const SCATTER_MIN_DISTINCT: usize = 10;

// ============================================================================
// Export
// ============================================================================

/// Placeholder written to CSV for null/empty values
pub const EMPTY_PLACEHOLDER: &str = "—";

/// UTF-8 byte-order mark prepended by the advanced CSV exporter
pub const UTF8_BOM: &str = "\u{feff}";

/// Logical width of the off-screen raster canvas
pub const RASTER_WIDTH: u32 = 1400;

/// Logical height of the off-screen raster canvas
pub const RASTER_HEIGHT: u32 = 900;

/// Device scale applied when rasterizing
pub const RASTER_SCALE: u32 = 2;

/// Fallback title when the user supplies none
pub const DEFAULT_EXPORT_TITLE: &str = "export";

// ============================================================================
// AI Endpoint
// ============================================================================

/// Default generative-language API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model name
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Number of rows included verbatim in the data context sent to the model
pub const CONTEXT_SAMPLE_ROWS: usize = 5;

/// Attempts made by the retry helper (including the first)
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff, in milliseconds
pub const RETRY_BASE_DELAY_MS: u64 = 1000;
