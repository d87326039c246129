//! Export service
//!
//! [`Exporter`] is the single entry point front ends call. It renders, names
//! and delivers artifacts, and turns every failure into a logged error plus
//! an error toast instead of propagating it.

use super::csv_writer::render_csv;
use super::page::{DocumentSurface, source_document};
use super::raster::{ChartSurface, rasterize};
use super::rtf::render_rtf;
use super::text::render_text;
use super::{
    ExportArtifact, ExportError, ExportFormat, ExportResult, ExportSource, build_filename,
    timestamped_filename,
};
use crate::notifications::{Toast, ToastManager};
use crate::perf::ScopedTimer;
use crate::types::{ChartData, ChartType};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Destination for finished artifacts
pub trait ArtifactSink {
    /// Deliver `artifact`, returning where it ended up.
    fn save(&self, artifact: &ExportArtifact) -> ExportResult<PathBuf>;
}

/// Writes artifacts into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, artifact: &ExportArtifact) -> ExportResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.bytes)?;
        Ok(path)
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<ExportArtifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<ExportArtifact> {
        self.artifacts.lock().clone()
    }
}

impl ArtifactSink for MemorySink {
    fn save(&self, artifact: &ExportArtifact) -> ExportResult<PathBuf> {
        self.artifacts.lock().push(artifact.clone());
        Ok(PathBuf::from(&artifact.filename))
    }
}

/// Render `source` in `format` without naming or delivering it.
pub fn render(source: &ExportSource, format: ExportFormat) -> ExportResult<Vec<u8>> {
    if source.is_empty() {
        return Err(ExportError::EmptyContent);
    }
    let text = match format {
        ExportFormat::Text => render_text(source)?,
        ExportFormat::Csv => render_csv(source, false)?,
        ExportFormat::CsvWithBom => render_csv(source, true)?,
        ExportFormat::Rtf => render_rtf(source)?,
        ExportFormat::Png => {
            let doc = source_document(source)?;
            return rasterize(&DocumentSurface::new(&doc));
        }
    };
    Ok(text.into_bytes())
}

/// Renders, names and delivers exports, reporting outcomes as toasts.
pub struct Exporter<S: ArtifactSink> {
    sink: S,
    toasts: ToastManager,
    timestamped: bool,
}

impl<S: ArtifactSink> Exporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            toasts: ToastManager::new(),
            timestamped: true,
        }
    }

    /// Name files `{title}.{ext}` instead of `{title}_{millis}.{ext}`
    pub fn without_timestamps(mut self) -> Self {
        self.timestamped = false;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastManager {
        &mut self.toasts
    }

    fn filename(&self, title: &str, format: ExportFormat) -> String {
        if self.timestamped {
            timestamped_filename(title, format.extension())
        } else {
            build_filename(title, format.extension(), None)
        }
    }

    /// Export content. Returns the saved location, or `None` on failure.
    pub fn export(
        &mut self,
        source: &ExportSource,
        format: ExportFormat,
        title: &str,
    ) -> Option<PathBuf> {
        let _timer = ScopedTimer::with_default_threshold("export");
        tracing::debug!(source = source.kind(), format = format.label(), "Exporting");
        let result = render(source, format)
            .map(|bytes| ExportArtifact::new(bytes, self.filename(title, format), format));
        self.deliver(result, format)
    }

    /// Export a chart as PNG. Returns the saved location, or `None` on failure.
    pub fn export_chart(
        &mut self,
        chart_type: ChartType,
        data: &ChartData,
        title: &str,
    ) -> Option<PathBuf> {
        let _timer = ScopedTimer::with_default_threshold("export_chart");
        let format = ExportFormat::Png;
        let result = rasterize(&ChartSurface::new(chart_type, data).with_title(title))
            .map(|bytes| ExportArtifact::new(bytes, self.filename(title, format), format));
        self.deliver(result, format)
    }

    fn deliver(
        &mut self,
        artifact: ExportResult<ExportArtifact>,
        format: ExportFormat,
    ) -> Option<PathBuf> {
        match artifact.and_then(|a| self.sink.save(&a)) {
            Ok(path) => {
                tracing::info!(format = format.label(), path = %path.display(), "Exported");
                self.toasts
                    .push(Toast::success(format!("Exported {}", path.display())));
                Some(path)
            }
            Err(err) => {
                tracing::error!(format = format.label(), error = %err, "Export failed");
                self.toasts.push(Toast::error(format!(
                    "{} export failed: {}",
                    format.label(),
                    err
                )));
                None
            }
        }
    }
}
