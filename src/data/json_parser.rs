//! JSON data parsing
//!
//! Parses JSON arrays of objects into a [`Dataset`], and writes rows back out
//! as pretty JSON.

use crate::data::error::{DataError, DataResult};
use crate::types::{DataCell, DataOrigin, Dataset, Row};
use serde_json::Value;
use std::path::Path;

/// Parse a JSON file into a Dataset
pub fn parse_json_file(path: &Path) -> DataResult<Dataset> {
    let content = std::fs::read_to_string(path)?;

    let mut ds = parse_json_content(&content)?;

    // Set name from filename
    ds.name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Data")
        .to_string();

    ds.origin = DataOrigin::Json {
        path: Some(path.to_path_buf()),
    };

    Ok(ds)
}

/// Parse JSON content from a string
///
/// Non-object array elements are skipped. Key order of each object is kept.
pub fn parse_json_content(json: &str) -> DataResult<Dataset> {
    let value: Value = serde_json::from_str(json)?;

    let array = extract_array(&value)?;

    let rows: Vec<Row> = array
        .iter()
        .filter_map(|v| {
            let obj = v.as_object()?;
            let row: Row = obj
                .iter()
                .map(|(k, v)| (k.clone(), DataCell::from(v.clone())))
                .collect();
            Some(row)
        })
        .collect();

    if !array.is_empty() && rows.is_empty() {
        return Err(DataError::InvalidData(
            "Array elements must be objects".to_string(),
        ));
    }

    Ok(Dataset {
        name: "Data".to_string(),
        rows,
        origin: DataOrigin::Json { path: None },
    })
}

/// Extract the array from JSON value, handling common wrapper patterns
fn extract_array(value: &Value) -> DataResult<&Vec<Value>> {
    match value {
        Value::Array(arr) => Ok(arr),
        Value::Object(obj) => {
            // Try common wrapper patterns: data, rows, items, records, results
            let wrapper_keys = ["data", "rows", "items", "records", "results"];
            for key in wrapper_keys {
                if let Some(Value::Array(arr)) = obj.get(key) {
                    return Ok(arr);
                }
            }
            Err(DataError::InvalidData(
                "JSON must be an array or have a data/rows/items/records/results array"
                    .to_string(),
            ))
        }
        _ => Err(DataError::InvalidData(
            "JSON must be an array of objects".to_string(),
        )),
    }
}

/// Convert rows to JSON string content (array of objects)
pub fn write_json_content(rows: &[Row]) -> String {
    serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
}
