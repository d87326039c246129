//! PNG export
//!
//! Anything that can paint itself into a drawing area implements
//! [`RasterSurface`]. [`rasterize`] renders a surface off-screen into a
//! 1400×900 white canvas at 2× scale with `plotters`' bitmap backend and
//! encodes the pixels as PNG with `image`. The pixel buffer lives only for
//! the duration of the call.
//!
//! Text is drawn with fonts compiled into the binary: a sans-serif family for
//! prose and labels and a monospace family for code.

use super::{ExportError, ExportResult};
use crate::constants::{RASTER_HEIGHT, RASTER_SCALE, RASTER_WIDTH};
use crate::types::{ChartColor, ChartData, ChartSeries, ChartType, SeriesData};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use once_cell::sync::Lazy;
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use std::ops::Range;

/// Drawing area handed to a [`RasterSurface`]
pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Font family for prose, captions and labels
pub const SANS_FAMILY: &str = "sans-serif";
/// Font family for code
pub const MONO_FAMILY: &str = "monospace";

static FONTS: Lazy<Result<(), String>> = Lazy::new(|| {
    register_font(SANS_FAMILY, FontStyle::Normal, epaint_default_fonts::UBUNTU_LIGHT)
        .and_then(|_| {
            register_font(MONO_FAMILY, FontStyle::Normal, epaint_default_fonts::HACK_REGULAR)
        })
        .map_err(|_| "bundled font rejected: invalid font data".to_string())
});

/// Something that paints into an off-screen canvas
pub trait RasterSurface {
    fn paint(&self, canvas: &Canvas<'_>) -> ExportResult<()>;
}

pub(super) fn raster_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Raster(err.to_string())
}

fn rgb(color: ChartColor) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

/// Text style in `family` at `size` logical pixels.
pub fn text_style(family: &'static str, size: u32, color: &RGBColor) -> TextStyle<'static> {
    (family, f64::from(size * RASTER_SCALE)).into_font().color(color)
}

/// Render `surface` and return PNG bytes.
pub fn rasterize(surface: &dyn RasterSurface) -> ExportResult<Vec<u8>> {
    FONTS.clone().map_err(ExportError::Raster)?;

    let (width, height) = (RASTER_WIDTH * RASTER_SCALE, RASTER_HEIGHT * RASTER_SCALE);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];

    {
        let canvas = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        canvas.fill(&WHITE).map_err(raster_error)?;
        surface.paint(&canvas)?;
        canvas.present().map_err(raster_error)?;
    }

    let png = encode_png(&buffer, width, height)?;
    tracing::debug!(width, height, bytes = png.len(), "Rasterized surface");
    Ok(png)
}

/// Encode a packed RGB8 buffer as PNG.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> ExportResult<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(pixels, width, height, ExtendedColorType::Rgb8)?;
    Ok(png)
}

// ============================================================================
// Charts
// ============================================================================

/// A chart as a raster surface
pub struct ChartSurface<'a> {
    pub chart_type: ChartType,
    pub data: &'a ChartData,
    pub title: &'a str,
}

impl<'a> ChartSurface<'a> {
    pub fn new(chart_type: ChartType, data: &'a ChartData) -> Self {
        Self {
            chart_type,
            data,
            title: "",
        }
    }

    /// Caption drawn above the plot
    pub fn with_title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }
}

const MARGIN: u32 = 40 * RASTER_SCALE;
const LABEL_AREA: u32 = 60 * RASTER_SCALE;
const STROKE: u32 = 2 * RASTER_SCALE;
const POINT_RADIUS: u32 = 5 * RASTER_SCALE;
const CAPTION_SIZE: u32 = 28;
const LABEL_SIZE: u32 = 14;
const DESC_SIZE: u32 = 16;

type Plot<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Value range padded by 10% and always including zero
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if hi > lo { hi - lo } else { 1.0 };
    let lo = if lo < 0.0 { lo - span * 0.05 } else { 0.0 };
    lo..hi + span * 0.1
}

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    lo - pad..hi + pad
}

/// Category slots are centered on integers: slot `i` spans `i-0.5..i+0.5`.
fn category_range(count: usize) -> Range<f64> {
    -0.5..count.max(1) as f64 - 0.5
}

impl ChartSurface<'_> {
    fn plot<'a, 'b>(
        &self,
        canvas: &'a Canvas<'b>,
        x: Range<f64>,
        y: Range<f64>,
    ) -> ExportResult<Plot<'a, 'b>> {
        let mut builder = ChartBuilder::on(canvas);
        builder
            .margin(MARGIN)
            .x_label_area_size(LABEL_AREA)
            .y_label_area_size(LABEL_AREA);
        if !self.title.is_empty() {
            builder.caption(self.title, text_style(SANS_FAMILY, CAPTION_SIZE, &BLACK));
        }
        builder.build_cartesian_2d(x, y).map_err(raster_error)
    }

    /// Tick labels plus axis descriptions. Category charts label integer
    /// ticks with `data.labels`.
    fn paint_mesh(&self, chart: &mut Plot<'_, '_>, series: &ChartSeries, categorical: bool) -> ExportResult<()> {
        let labels = &self.data.labels;
        let category = |v: &f64| -> String {
            let slot = v.round();
            if (v - slot).abs() > 1e-6 || slot < 0.0 {
                return String::new();
            }
            labels.get(slot as usize).cloned().unwrap_or_default()
        };

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .label_style(text_style(SANS_FAMILY, LABEL_SIZE, &BLACK))
            .axis_desc_style(text_style(SANS_FAMILY, DESC_SIZE, &BLACK))
            .y_desc(series.label.as_str());
        if categorical {
            mesh.x_labels(labels.len().max(1)).x_label_formatter(&category);
        }
        mesh.draw().map_err(raster_error)
    }
}

impl RasterSurface for ChartSurface<'_> {
    fn paint(&self, canvas: &Canvas<'_>) -> ExportResult<()> {
        let Some(series) = self.data.datasets.first() else {
            return Ok(());
        };
        match self.chart_type {
            ChartType::Pie if self.title.is_empty() => paint_pie(canvas, series, &self.data.labels),
            ChartType::Pie => {
                let area = canvas
                    .titled(self.title, text_style(SANS_FAMILY, CAPTION_SIZE, &BLACK))
                    .map_err(raster_error)?;
                paint_pie(&area, series, &self.data.labels)
            }
            ChartType::Scatter => self.paint_scatter(canvas, series),
            ChartType::Line | ChartType::Area => {
                self.paint_line(canvas, series, self.chart_type == ChartType::Area)
            }
            ChartType::Bar | ChartType::Histogram => self.paint_bars(canvas, series),
        }
    }
}

fn paint_baseline(chart: &mut Plot<'_, '_>, x: &Range<f64>, y: &Range<f64>) -> ExportResult<()> {
    if y.start >= 0.0 || y.end <= 0.0 {
        return Ok(());
    }
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x.start, 0.0), (x.end, 0.0)],
            BLACK.stroke_width(STROKE / 2),
        )))
        .map_err(raster_error)?;
    Ok(())
}

impl ChartSurface<'_> {
    fn paint_bars(&self, canvas: &Canvas<'_>, series: &ChartSeries) -> ExportResult<()> {
        let values = series.data.values();
        let x = category_range(values.len());
        let y = value_range(values.iter().copied());
        let mut chart = self.plot(canvas, x.clone(), y.clone())?;
        self.paint_mesh(&mut chart, series, true)?;

        chart
            .draw_series(values.iter().enumerate().map(|(i, &v)| {
                let color = rgb(series.background_color.at(i));
                let center = i as f64;
                Rectangle::new([(center - 0.35, 0.0), (center + 0.35, v)], color.filled())
            }))
            .map_err(raster_error)?;

        paint_baseline(&mut chart, &x, &y)
    }

    fn paint_line(&self, canvas: &Canvas<'_>, series: &ChartSeries, fill: bool) -> ExportResult<()> {
        let values = series.data.values();
        let x = category_range(values.len());
        let y = value_range(values.iter().copied());
        let color = rgb(series.border_color.at(0));
        let mut chart = self.plot(canvas, x.clone(), y.clone())?;
        self.paint_mesh(&mut chart, series, true)?;

        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect();

        if let (true, Some(first), Some(last)) = (fill, points.first(), points.last()) {
            let mut outline = points.clone();
            outline.push((last.0, 0.0));
            outline.push((first.0, 0.0));
            chart
                .draw_series(std::iter::once(Polygon::new(outline, color.mix(0.3).filled())))
                .map_err(raster_error)?;
        }

        chart
            .draw_series(std::iter::once(PathElement::new(
                points.clone(),
                color.stroke_width(STROKE * 2),
            )))
            .map_err(raster_error)?;
        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|p| Circle::new(p, POINT_RADIUS, color.filled())),
            )
            .map_err(raster_error)?;

        paint_baseline(&mut chart, &x, &y)
    }

    fn paint_scatter(&self, canvas: &Canvas<'_>, series: &ChartSeries) -> ExportResult<()> {
        let SeriesData::Points(points) = &series.data else {
            return Ok(());
        };
        let x = padded_range(points.iter().map(|p| p.x));
        let y = padded_range(points.iter().map(|p| p.y));
        let color = rgb(series.background_color.at(0));
        let mut chart = self.plot(canvas, x, y)?;
        self.paint_mesh(&mut chart, series, false)?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p.x, p.y), POINT_RADIUS, color.mix(0.8).filled())),
            )
            .map_err(raster_error)?;
        Ok(())
    }
}

/// Pie slices as filled polygons approximating each arc, with a legend of
/// labels and values on the left.
fn paint_pie(canvas: &Canvas<'_>, series: &ChartSeries, labels: &[String]) -> ExportResult<()> {
    let values = series.data.values();
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let (width, height) = canvas.dim_in_pixel();
    let center = (width as f64 * 0.6, height as f64 / 2.0);
    let radius = f64::from((width / 2).min(height)) * 0.4;
    let to_pixel = |angle: f64| {
        (
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        )
    };

    let legend_style = text_style(SANS_FAMILY, LABEL_SIZE, &BLACK);
    let swatch = (LABEL_SIZE * RASTER_SCALE) as i32;
    let line_height = swatch * 2;
    let mut legend_y = MARGIN as i32;

    let mut start = -std::f64::consts::FRAC_PI_2;
    for (i, &value) in values.iter().enumerate() {
        if value <= 0.0 {
            continue;
        }
        let sweep = value / total * std::f64::consts::TAU;
        let steps = ((sweep / 0.02).ceil() as usize).max(2);

        let mut outline = vec![(center.0.round() as i32, center.1.round() as i32)];
        outline.extend((0..=steps).map(|s| to_pixel(start + sweep * s as f64 / steps as f64)));

        let color = rgb(series.background_color.at(i));
        canvas
            .draw(&Polygon::new(outline, color.filled()))
            .map_err(raster_error)?;
        start += sweep;

        if legend_y + line_height <= height as i32 {
            let x = MARGIN as i32;
            canvas
                .draw(&Rectangle::new([(x, legend_y), (x + swatch, legend_y + swatch)], color.filled()))
                .map_err(raster_error)?;
            let label = labels.get(i).map(String::as_str).unwrap_or_default();
            canvas
                .draw_text(
                    &format!("{} ({})", label, value),
                    &legend_style,
                    (x + swatch * 2, legend_y),
                )
                .map_err(raster_error)?;
            legend_y += line_height;
        }
    }
    Ok(())
}
