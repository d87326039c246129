//! Unit tests for export naming and CSV fidelity.

use crate::helpers::TestRowsBuilder;
use datachat::export::{
    ExportFormat, ExportSource, Exporter, MemorySink, render_csv, rows_to_csv, timestamped_filename,
};
use datachat::types::DataCell;
use regex::Regex;

#[test]
fn test_timestamped_filenames_match_pattern() {
    let pattern = Regex::new(r"^[a-z0-9_]+_\d+\.\w+$").unwrap();
    for title in ["Quarterly Report", "données / 2024", "", "!!!", "a"] {
        for ext in ["txt", "csv", "rtf", "png"] {
            let name = timestamped_filename(title, ext);
            assert!(pattern.is_match(&name), "{}", name);
        }
    }
}

#[test]
fn test_exporter_names_match_pattern() {
    let pattern = Regex::new(r"^[a-z0-9_]+_\d+\.csv$").unwrap();
    let mut exporter = Exporter::new(MemorySink::new());
    exporter.export(&ExportSource::from("a,b,c"), ExportFormat::CsvWithBom, "Café Data").unwrap();
    let saved = exporter.sink().artifacts();
    assert!(pattern.is_match(&saved[0].filename), "{}", saved[0].filename);
}

fn read_back(csv_text: &str) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(csv_text.as_bytes())
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_row_export_survives_standard_reader() {
    let awkward = [
        "plain",
        "comma, inside",
        "quote \" inside",
        "\"fully quoted\"",
        "line\nbreak",
        "carriage\r\nreturn",
        "trailing space ",
    ];
    let mut builder = TestRowsBuilder::new(&["id", "value"]);
    for (i, value) in awkward.iter().enumerate() {
        builder = builder.typed_row(vec![DataCell::from(i as i64), DataCell::from(*value)]);
    }
    let rows = builder.build();

    let records = read_back(&rows_to_csv(&rows));
    assert_eq!(records[0], vec!["id", "value"]);
    for (i, value) in awkward.iter().enumerate() {
        assert_eq!(records[i + 1], vec![i.to_string(), value.to_string()]);
    }
}

#[test]
fn test_markdown_table_survives_standard_reader() {
    let md = "| name | note |\n|---|---|\n| Ann | says \"hi\" |\n| Bob | a, b |\n";
    let csv_text = render_csv(&ExportSource::from(md), false).unwrap();
    assert_eq!(
        read_back(&csv_text),
        vec![
            vec!["name", "note"],
            vec!["Ann", "says \"hi\""],
            vec!["Bob", "a, b"],
        ]
    );
}

#[test]
fn test_bom_is_only_prefix() {
    let csv_text = render_csv(&ExportSource::from("| a |\n|---|\n| 1 |"), true).unwrap();
    let without = csv_text.strip_prefix('\u{feff}').unwrap();
    assert_eq!(without, "a\n1");
}

#[test]
fn test_markdown_answer_exports_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let mut exporter = Exporter::new(datachat::export::DirectorySink::new(dir.path())).without_timestamps();
    let answer = "# Sales\n\nRevenue rose **10%**.\n\n| region | units |\n|---|---|\n| north | 24 |\n";

    let path = exporter.export(&ExportSource::from(answer), ExportFormat::Png, "Report").unwrap();
    assert_eq!(path.file_name().unwrap(), "report.png");

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (2800, 1800));
    assert!(image.pixels().any(|p| p.0 != [255, 255, 255]));
}
