//! End-to-end: load a file, profile it, chart it and export the results.

use crate::helpers::{SALES_CSV, write_file};
use datachat::data::{
    DataError, analyze_structure, generate_chart_data, load_dataset, suggest_chart_type, validate_data,
};
use datachat::export::{DirectorySink, ExportFormat, ExportSource, Exporter};
use datachat::notifications::ToastVariant;
use datachat::types::{ChartConfig, ChartType, ColumnType};
use tempfile::tempdir;

#[test]
fn test_csv_to_chart_to_png() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "Sales 2024.csv", SALES_CSV);

    let dataset = load_dataset(&path).unwrap();
    assert_eq!(dataset.name, "Sales 2024");
    assert_eq!(dataset.row_count(), 8);

    let columns = analyze_structure(&dataset.rows);
    assert!(validate_data(&dataset.rows, Some(&columns)).is_valid);

    let chart_type = suggest_chart_type(&dataset.rows, "region", Some("units"));
    assert_eq!(chart_type, ChartType::Bar);
    let data = generate_chart_data(
        &dataset.rows,
        &ChartConfig::new(chart_type).with_axes("region", "units"),
    )
    .unwrap();
    assert_eq!(data.labels, vec!["east", "north", "south", "west"]);

    let out = dir.path().join("exports");
    let mut exporter = Exporter::new(DirectorySink::new(&out));
    let png = exporter.export_chart(chart_type, &data, &dataset.name).unwrap();

    let name = png.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("sales_2024_") && name.ends_with(".png"), "{}", name);
    let image = image::open(&png).unwrap();
    assert_eq!((image.width(), image.height()), (2800, 1800));
    assert_eq!(exporter.toasts().latest().unwrap().variant, ToastVariant::Success);
}

#[test]
fn test_json_file_rows_export_to_csv() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "people.json",
        r#"{"data": [{"name": "Ann", "age": 31, "city": "Oslo"}, {"name": "Bo", "age": null}]}"#,
    );

    let dataset = load_dataset(&path).unwrap();
    let columns = analyze_structure(&dataset.rows);
    assert_eq!(columns[1].inferred_type, ColumnType::Number);
    assert!(columns[1].nullable);

    let mut exporter = Exporter::new(DirectorySink::new(dir.path())).without_timestamps();
    let saved = exporter
        .export(&ExportSource::Rows(dataset.rows), ExportFormat::CsvWithBom, "People")
        .unwrap();

    assert_eq!(saved, dir.path().join("people.csv"));
    let text = std::fs::read_to_string(&saved).unwrap();
    assert_eq!(text, "\u{feff}name,age,city\nAnn,31,Oslo\nBo,—,—");
}

#[test]
fn test_unsupported_file_and_missing_axis() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "notes.md", "# nope");
    assert!(matches!(load_dataset(&path), Err(DataError::UnsupportedFormat(_))));

    let path = write_file(dir.path(), "data.csv", SALES_CSV);
    let dataset = load_dataset(&path).unwrap();
    let err = generate_chart_data(&dataset.rows, &ChartConfig::new(ChartType::Line).with_x("month"));
    assert!(matches!(err, Err(DataError::MissingAxis { .. })));
}

#[test]
fn test_failed_export_leaves_no_file() {
    let dir = tempdir().unwrap();
    let mut exporter = Exporter::new(DirectorySink::new(dir.path()));

    assert!(exporter.export(&ExportSource::Rows(Vec::new()), ExportFormat::Csv, "empty").is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let toast = exporter.toasts().latest().unwrap();
    assert_eq!(toast.variant, ToastVariant::Error);
    assert!(toast.message.contains("Nothing to export"));
}
