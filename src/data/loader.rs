//! File input dispatch by extension.

use crate::data::error::{DataError, DataResult};
use crate::data::{is_data_file, parse_csv_file, parse_json_file};
use crate::types::Dataset;
use std::path::Path;

/// Load a `.csv`, `.txt` or `.json` file.
pub fn load_dataset(path: &Path) -> DataResult<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !is_data_file(path) {
        return Err(DataError::UnsupportedFormat(ext));
    }

    let dataset = if ext == "json" {
        parse_json_file(path)?
    } else {
        parse_csv_file(path)?
    };

    tracing::info!(
        name = %dataset.name,
        rows = dataset.row_count(),
        "Loaded dataset from {}",
        path.display()
    );
    Ok(dataset)
}
