//! Snapshot tests using the insta crate.
//!
//! Inline snapshots pin the exact bytes each exporter produces for a
//! representative model answer.
//!
//! To update snapshots after intentional changes:
//! ```sh
//! cargo insta test --accept
//! ```

use crate::helpers::sales_rows;
use datachat::data::{generate_chart_data, generate_insights};
use datachat::export::{Document, ExportSource, render_csv, render_plain, render_rtf};
use datachat::types::{AggregationType, ChartConfig, ChartType};

const ANSWER: &str = "\
## Units by region

North leads, with **24** units.

| Region | Units |
|:-------|------:|
| north  | 24    |
| east   | 34    |

- East has the *largest* orders
- South shipped late
";

#[test]
fn snapshot_answer_csv() {
    let csv = render_csv(&ExportSource::from(ANSWER), false).unwrap();
    insta::assert_snapshot!(csv, @r"
    Region,Units
    north,24
    east,34
    ");
}

#[test]
fn snapshot_answer_plain_text() {
    insta::assert_snapshot!(render_plain(&Document::parse(ANSWER)), @r"
    Units by region

    North leads, with 24 units.

    Region	Units
    north	24
    east	34

    • East has the largest orders
    • South shipped late
    ");
}

#[test]
fn snapshot_answer_rtf() {
    let rtf = render_rtf(&ExportSource::from("# Title\n\nSome **bold** text.\n\n- item\n")).unwrap();
    insta::assert_snapshot!(rtf, @r"
    {\rtf1\ansi\ansicpg1252\deff0
    {\fonttbl{\f0\froman\fcharset0 Times New Roman;}{\f1\fmodern\fcharset0 Courier New;}}
    {\colortbl;\red0\green0\blue0;\red37\green99\blue235;}
    \f0\fs24
    {\pard\sb240\sa120\b\fs48 Title\par}
    {\pard\sa120 Some {\b bold} text.\par}
    {\pard\li360\fi-360 \bullet\tab item\par}
    }
    ");
}

#[test]
fn snapshot_bar_chart_insights() {
    let rows = sales_rows();
    let config = ChartConfig::new(ChartType::Bar)
        .with_axes("region", "units")
        .with_aggregation(AggregationType::Sum);
    let data = generate_chart_data(&rows, &config).unwrap();

    insta::assert_snapshot!(generate_insights(&rows, &config, &data).join("\n"), @r"
    Dataset contains 8 records
    'region' has 4 distinct value(s)
    'units' ranges from 3 to 20 (average 10.00)
    Peak value 34 at 'east'
    ");
}
