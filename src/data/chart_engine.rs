//! Chart data processing engine
//!
//! Turns rows plus a [`ChartConfig`] into chart-ready series. Grouping,
//! aggregation, binning and coloring all happen here rather than in the
//! render path, so renderers only ever see [`ChartData`].
//!
//! ## Shapes
//!
//! - bar / line / area: one value per distinct x label, labels sorted
//! - pie: frequency of each distinct x label, first-seen order
//! - scatter: one `{x, y}` point per row where both coerce to numbers
//! - histogram: equal-width bins over numeric x values

use crate::constants::{MAX_HISTOGRAM_BINS, PIE_MAX_CATEGORIES, SAMPLE_SIZE, SCATTER_MIN_DISTINCT};
use crate::data::aggregate::apply;
use crate::data::error::{DataError, DataResult};
use crate::data::profile::infer_column_type;
use crate::perf::ScopedTimer;
use crate::types::{
    AggregationType, ChartColor, ChartConfig, ChartData, ChartSeries, ChartType, ColumnType,
    DataCell, Paint, Row, ScatterPoint, SeriesData,
};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};

/// Chart color palette - highly distinct colors for data visualization
pub const CHART_COLORS: [ChartColor; 8] = [
    ChartColor::rgb(43, 108, 238),  // Bright Blue
    ChartColor::rgb(29, 201, 86),   // Green
    ChartColor::rgb(249, 140, 31),  // Orange
    ChartColor::rgb(140, 54, 226),  // Violet/Purple
    ChartColor::rgb(232, 48, 48),   // Red
    ChartColor::rgb(29, 201, 186),  // Cyan/Teal
    ChartColor::rgb(242, 223, 13),  // Yellow
    ChartColor::rgb(226, 54, 169),  // Pink/Magenta
];

/// Palette color for `index`, cycling
pub fn palette_color(index: usize) -> ChartColor {
    CHART_COLORS[index % CHART_COLORS.len()]
}

fn palette_cycle(count: usize) -> Paint {
    Paint::PerPoint((0..count).map(palette_color).collect())
}

// ============================================================================
// Generation
// ============================================================================

/// Build chart data for `config`.
///
/// Axes are checked before anything else, so a missing axis is an error even
/// on an empty dataset. With valid axes and no rows the result is
/// [`ChartData::empty`].
pub fn generate_chart_data(rows: &[Row], config: &ChartConfig) -> DataResult<ChartData> {
    let _timer = ScopedTimer::with_default_threshold("generate_chart_data");
    let chart = config.chart_type.label();

    let x = config
        .x_axis
        .as_deref()
        .ok_or(DataError::MissingAxis { chart, axis: "x" })?;
    let y = match config.chart_type {
        ChartType::Pie | ChartType::Histogram => None,
        _ => Some(
            config
                .y_axis
                .as_deref()
                .ok_or(DataError::MissingAxis { chart, axis: "y" })?,
        ),
    };

    if rows.is_empty() {
        return Ok(ChartData::empty());
    }

    let data = match (config.chart_type, y) {
        (ChartType::Pie, _) => pie_data(rows, x),
        (ChartType::Histogram, _) => histogram_data(rows, x),
        (ChartType::Scatter, Some(y)) => scatter_data(rows, x, y),
        (_, Some(y)) => grouped_data(rows, x, y, config),
        (_, None) => ChartData::empty(),
    };

    tracing::debug!(
        chart,
        labels = data.labels.len(),
        series = data.datasets.len(),
        "Generated chart data"
    );
    Ok(data)
}

/// Bar, line and area: aggregate numeric y per stringified x.
fn grouped_data(rows: &[Row], x: &str, y: &str, config: &ChartConfig) -> ChartData {
    let op = config.aggregation.unwrap_or_default();

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows {
        let values = groups.entry(row.cell(x).to_string()).or_default();
        if let Some(value) = row.cell(y).as_number() {
            values.push(value);
        }
    }

    let (labels, values): (Vec<String>, Vec<f64>) = groups
        .into_iter()
        .map(|(label, values)| {
            let value = apply(op, &values).as_number().unwrap_or(0.0);
            (label, value)
        })
        .unzip();

    let (background, border) = match config.chart_type {
        ChartType::Bar => (palette_cycle(values.len()), palette_cycle(values.len())),
        _ => (Paint::Single(palette_color(0)), Paint::Single(palette_color(0))),
    };

    ChartData {
        labels,
        datasets: vec![ChartSeries {
            label: series_label(y, op),
            data: SeriesData::Values(values),
            background_color: background,
            border_color: border,
        }],
    }
}

fn series_label(y: &str, op: AggregationType) -> String {
    format!("{} ({})", y, op.label())
}

/// Pie: frequency of each stringified x value, first-seen order.
fn pie_data(rows: &[Row], x: &str) -> ChartData {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in rows {
        let label = match row.cell(x) {
            cell if cell.is_empty() => "Unknown".to_string(),
            cell => cell.to_string(),
        };
        *counts.entry(label).or_default() += 1;
    }

    let (labels, values): (Vec<String>, Vec<f64>) = counts
        .into_iter()
        .map(|(label, count)| (label, count as f64))
        .unzip();
    let count = labels.len();

    ChartData {
        labels,
        datasets: vec![ChartSeries {
            label: x.to_string(),
            data: SeriesData::Values(values),
            background_color: palette_cycle(count),
            border_color: Paint::Single(ChartColor::rgb(255, 255, 255)),
        }],
    }
}

/// Scatter: rows where both axes coerce to numbers.
fn scatter_data(rows: &[Row], x: &str, y: &str) -> ChartData {
    let points: Vec<ScatterPoint> = rows
        .iter()
        .filter_map(|row| {
            Some(ScatterPoint {
                x: row.cell(x).as_number()?,
                y: row.cell(y).as_number()?,
            })
        })
        .collect();

    ChartData {
        labels: Vec::new(),
        datasets: vec![ChartSeries {
            label: format!("{} vs {}", y, x),
            data: SeriesData::Points(points),
            background_color: Paint::Single(palette_color(0)),
            border_color: Paint::Single(palette_color(0)),
        }],
    }
}

/// Histogram over the numeric x values.
///
/// Uses `min(20, ceil(sqrt(n)))` equal-width bins on `[min, max]`; the
/// maximum is clamped into the last bin. Constant data yields one bin.
fn histogram_data(rows: &[Row], x: &str) -> ChartData {
    let values: Vec<f64> = rows.iter().filter_map(|row| row.cell(x).as_number()).collect();
    if values.is_empty() {
        return ChartData::empty();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bins = if max > min {
        ((values.len() as f64).sqrt().ceil() as usize).clamp(1, MAX_HISTOGRAM_BINS)
    } else {
        1
    };
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in &values {
        let index = if width > 0.0 {
            (((value - min) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        counts[index] += 1;
    }

    let labels = (0..bins)
        .map(|i| {
            let low = min + width * i as f64;
            let high = if i + 1 == bins { max } else { min + width * (i + 1) as f64 };
            format!("{:.1}-{:.1}", low, high)
        })
        .collect();

    ChartData {
        labels,
        datasets: vec![ChartSeries {
            label: "Frequency".to_string(),
            data: SeriesData::Values(counts.into_iter().map(|c| c as f64).collect()),
            background_color: Paint::Single(palette_color(0)),
            border_color: Paint::Single(palette_color(0)),
        }],
    }
}

// ============================================================================
// Suggestions and insights
// ============================================================================

fn column_type(rows: &[Row], column: &str) -> ColumnType {
    let sample: Vec<&DataCell> = rows
        .iter()
        .take(SAMPLE_SIZE)
        .map(|row| row.cell(column))
        .filter(|c| !c.is_empty())
        .collect();
    infer_column_type(&sample)
}

fn distinct_count(rows: &[Row], column: &str) -> usize {
    rows.iter()
        .map(|row| row.cell(column).key())
        .collect::<HashSet<_>>()
        .len()
}

/// Pick a chart type from the shape of the selected columns.
pub fn suggest_chart_type(rows: &[Row], x: &str, y: Option<&str>) -> ChartType {
    let distinct_x = distinct_count(rows, x);

    let Some(y) = y else {
        return if distinct_x <= PIE_MAX_CATEGORIES {
            ChartType::Pie
        } else {
            ChartType::Bar
        };
    };

    let x_type = column_type(rows, x);
    let y_numeric = column_type(rows, y) == ColumnType::Number;

    if x_type == ColumnType::Number && y_numeric && distinct_x > SCATTER_MIN_DISTINCT {
        ChartType::Scatter
    } else if x_type == ColumnType::Date {
        ChartType::Line
    } else {
        ChartType::Bar
    }
}

/// Short narrative observations about a generated chart.
pub fn generate_insights(rows: &[Row], config: &ChartConfig, data: &ChartData) -> Vec<String> {
    let mut insights = vec![format!("Dataset contains {} records", rows.len())];

    if let Some(x) = config.x_axis.as_deref() {
        insights.push(format!(
            "'{}' has {} distinct value(s)",
            x,
            distinct_count(rows, x)
        ));
    }

    if let Some(y) = config.y_axis.as_deref() {
        let values: Vec<f64> = rows.iter().filter_map(|row| row.cell(y).as_number()).collect();
        if let (Some(min), Some(max)) = (
            values.iter().copied().reduce(f64::min),
            values.iter().copied().reduce(f64::max),
        ) {
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            insights.push(format!(
                "'{}' ranges from {} to {} (average {:.2})",
                y,
                DataCell::Number(min),
                DataCell::Number(max),
                avg
            ));
        }
    }

    let Some(series) = data.datasets.first() else {
        return insights;
    };
    let peak = series
        .data
        .values()
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        });

    match (config.chart_type, peak) {
        (ChartType::Pie, Some((i, count))) => {
            let total: f64 = series.data.values().iter().sum();
            insights.push(format!(
                "Most common category is '{}' ({} of {}, {:.1}%)",
                data.labels.get(i).map(String::as_str).unwrap_or_default(),
                DataCell::Number(count),
                DataCell::Number(total),
                count / total * 100.0
            ));
        }
        (ChartType::Bar | ChartType::Line | ChartType::Area, Some((i, value))) => {
            insights.push(format!(
                "Peak value {} at '{}'",
                DataCell::Number(value),
                data.labels.get(i).map(String::as_str).unwrap_or_default()
            ));
        }
        _ => {}
    }

    insights
}
