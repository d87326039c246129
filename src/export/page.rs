//! Markdown as an image
//!
//! [`DocumentSurface`] lays a [`Document`] out top to bottom on the raster
//! canvas: wrapped prose, indented list items, shaded code blocks and ruled
//! tables. Content that does not fit on the canvas is cut at the last whole
//! line.

use super::csv_writer::{json_rows, safe_fallback};
use super::document::{Block, Cell, Document, Inline, ListMarker, inline_text};
use super::raster::{Canvas, MONO_FAMILY, RasterSurface, SANS_FAMILY, raster_error, text_style};
use super::text::render_text;
use super::{ExportResult, ExportSource};
use crate::constants::RASTER_SCALE;
use crate::types::Row;
use plotters::prelude::*;

const PADDING: i32 = 48;
const BODY_SIZE: u32 = 16;
const CODE_SIZE: u32 = 14;
const LIST_INDENT: i32 = 24;
const CELL_PADDING: i32 = 8;

const TEXT: RGBColor = RGBColor(17, 24, 39);
const MUTED: RGBColor = RGBColor(75, 85, 99);
const CODE_TEXT: RGBColor = RGBColor(153, 27, 27);
const CODE_FILL: RGBColor = RGBColor(243, 244, 246);
const HEADER_FILL: RGBColor = RGBColor(229, 231, 235);
const BORDER: RGBColor = RGBColor(209, 213, 219);

fn px(logical: i32) -> i32 {
    logical * RASTER_SCALE as i32
}

fn heading_size(level: u8) -> u32 {
    match level {
        1 => 30,
        2 => 26,
        3 => 22,
        4 => 19,
        _ => 17,
    }
}

/// Content of any export source as a document: markdown is parsed, rows
/// and arrays of JSON objects become a table, other JSON a code block.
pub fn source_document(source: &ExportSource) -> ExportResult<Document> {
    let rows = match source {
        ExportSource::Markdown(text) => return Ok(Document::parse(text)),
        ExportSource::Rows(rows) => Some(rows.clone()),
        ExportSource::Json(value) => json_rows(value),
    };
    let block = match rows {
        Some(rows) => rows_table(&rows),
        None => Block::CodeBlock {
            language: Some("json".to_string()),
            code: render_text(source)?,
        },
    };
    Ok(Document { blocks: vec![block] })
}

fn rows_table(rows: &[Row]) -> Block {
    let columns: Vec<String> = rows
        .first()
        .map(|row| row.keys().map(str::to_string).collect())
        .unwrap_or_default();
    Block::Table {
        header: columns.iter().map(|c| vec![Inline::plain(c.as_str())]).collect(),
        rows: rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| vec![Inline::plain(safe_fallback(row.cell(c)))])
                    .collect()
            })
            .collect(),
    }
}

/// A parsed document as a raster surface
pub struct DocumentSurface<'a> {
    doc: &'a Document,
}

impl<'a> DocumentSurface<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }
}

impl RasterSurface for DocumentSurface<'_> {
    fn paint(&self, canvas: &Canvas<'_>) -> ExportResult<()> {
        let (width, height) = canvas.dim_in_pixel();
        let mut page = Page {
            canvas,
            left: px(PADDING),
            right: width as i32 - px(PADDING),
            bottom: height as i32 - px(PADDING),
            y: px(PADDING),
            full: false,
        };
        for block in &self.doc.blocks {
            page.block(block)?;
            if page.full {
                tracing::debug!(blocks = self.doc.blocks.len(), "Document cut to fit the canvas");
                break;
            }
        }
        Ok(())
    }
}

/// Font, size and color of a run of text
#[derive(Clone, Copy)]
struct Pen {
    family: &'static str,
    size: u32,
    color: RGBColor,
    bold: bool,
}

impl Pen {
    fn body() -> Self {
        Self {
            family: SANS_FAMILY,
            size: BODY_SIZE,
            color: TEXT,
            bold: false,
        }
    }

    fn code() -> Self {
        Self {
            family: MONO_FAMILY,
            size: CODE_SIZE,
            color: CODE_TEXT,
            bold: false,
        }
    }

    fn style(&self) -> TextStyle<'static> {
        text_style(self.family, self.size, &self.color)
    }

    fn line_height(&self) -> i32 {
        px(self.size as i32) * 3 / 2
    }
}

/// A word, or a forced line break
enum Piece {
    Word { text: String, pen: Pen, space_before: bool },
    Break,
}

/// Split inline runs into words, remembering where whitespace separated them.
fn pieces(content: &[Inline], base: Pen) -> Vec<Piece> {
    let mut out = Vec::new();
    let mut pending_space = false;
    let mut push_words = |text: &str, pen: Pen, out: &mut Vec<Piece>| {
        let mut word = String::new();
        for c in text.chars() {
            if c.is_whitespace() {
                if !word.is_empty() {
                    out.push(Piece::Word {
                        text: std::mem::take(&mut word),
                        pen,
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else {
                word.push(c);
            }
        }
        if !word.is_empty() {
            out.push(Piece::Word {
                text: word,
                pen,
                space_before: pending_space,
            });
            pending_space = false;
        }
    };

    for inline in content {
        match inline {
            Inline::Text { text, style } => {
                let pen = Pen {
                    bold: base.bold || style.strong,
                    color: if style.emphasis { MUTED } else { base.color },
                    ..base
                };
                push_words(text, pen, &mut out);
            }
            Inline::Code(code) => {
                let pen = Pen {
                    size: base.size.min(CODE_SIZE),
                    ..Pen::code()
                };
                push_words(code, pen, &mut out);
            }
            Inline::LineBreak => out.push(Piece::Break),
        }
    }
    out
}

struct Page<'c, 'a> {
    canvas: &'c Canvas<'a>,
    left: i32,
    right: i32,
    bottom: i32,
    /// Top of the next line
    y: i32,
    /// Set once a line did not fit
    full: bool,
}

impl Page<'_, '_> {
    /// Reserve `height` pixels, or mark the page full.
    fn room(&mut self, height: i32) -> bool {
        if self.y + height > self.bottom {
            self.full = true;
        }
        !self.full
    }

    fn measure(&self, text: &str, pen: &Pen) -> ExportResult<i32> {
        let (w, _) = self
            .canvas
            .estimate_text_size(text, &pen.style())
            .map_err(raster_error)?;
        Ok(w as i32)
    }

    fn text(&self, text: &str, pen: &Pen, x: i32, y: i32) -> ExportResult<()> {
        let style = pen.style();
        self.canvas.draw_text(text, &style, (x, y)).map_err(raster_error)?;
        if pen.bold {
            // Faux bold: the fonts ship a single weight
            self.canvas
                .draw_text(text, &style, (x + RASTER_SCALE as i32, y))
                .map_err(raster_error)?;
        }
        Ok(())
    }

    fn fill(&self, top_left: (i32, i32), bottom_right: (i32, i32), color: RGBColor) -> ExportResult<()> {
        self.canvas
            .draw(&Rectangle::new([top_left, bottom_right], color.filled()))
            .map_err(raster_error)
    }

    fn hline(&self, x0: i32, x1: i32, y: i32, color: RGBColor) -> ExportResult<()> {
        self.canvas
            .draw(&PathElement::new(vec![(x0, y), (x1, y)], color.stroke_width(RASTER_SCALE)))
            .map_err(raster_error)
    }

    /// Word-wrap `content` between `indent` and the right edge.
    fn flow(&mut self, content: &[Inline], base: Pen, indent: i32) -> ExportResult<()> {
        let line_height = base.line_height();
        let start = self.left + indent;
        let space = px(base.size as i32) / 4;
        if !self.room(line_height) {
            return Ok(());
        }

        let mut x = start;
        for piece in pieces(content, base) {
            match piece {
                Piece::Break => {
                    self.y += line_height;
                    x = start;
                    if !self.room(line_height) {
                        return Ok(());
                    }
                }
                Piece::Word { text, pen, space_before } => {
                    let width = self.measure(&text, &pen)?;
                    if space_before && x > start {
                        x += space;
                    }
                    if x + width > self.right && x > start {
                        self.y += line_height;
                        x = start;
                        if !self.room(line_height) {
                            return Ok(());
                        }
                    }
                    self.text(&text, &pen, x, self.y)?;
                    x += width;
                }
            }
        }
        self.y += line_height;
        Ok(())
    }

    fn block(&mut self, block: &Block) -> ExportResult<()> {
        match block {
            Block::Heading { level, content } => {
                self.y += px(heading_size(*level) as i32) / 2;
                let pen = Pen {
                    size: heading_size(*level),
                    bold: true,
                    ..Pen::body()
                };
                self.flow(content, pen, 0)?;
            }
            Block::Paragraph(content) => self.flow(content, Pen::body(), 0)?,
            Block::Quote(content) => {
                let top = self.y;
                let pen = Pen {
                    color: MUTED,
                    ..Pen::body()
                };
                self.flow(content, pen, px(LIST_INDENT))?;
                let bar = px(4);
                self.fill((self.left, top), (self.left + bar, self.y.min(self.bottom)), BORDER)?;
            }
            Block::ListItem { depth, marker, content } => {
                let pen = Pen::body();
                if !self.room(pen.line_height()) {
                    return Ok(());
                }
                let indent = px(LIST_INDENT) * (*depth as i32 + 1);
                let label = match marker {
                    ListMarker::Bullet => "•".to_string(),
                    ListMarker::Number(n) => format!("{}.", n),
                };
                self.text(&label, &pen, self.left + indent - px(LIST_INDENT) + px(4), self.y)?;
                self.flow(content, pen, indent)?;
                // Items sit closer together than paragraphs
                self.y -= pen.line_height() / 3;
            }
            Block::CodeBlock { code, .. } => self.code_block(code)?,
            Block::Table { header, rows } => self.table(header, rows)?,
            Block::Rule => {
                if self.room(px(BODY_SIZE as i32)) {
                    let y = self.y + px(BODY_SIZE as i32) / 2;
                    self.hline(self.left, self.right, y, BORDER)?;
                    self.y += px(BODY_SIZE as i32);
                }
            }
        }
        // Gap between blocks
        self.y += px(BODY_SIZE as i32) / 2;
        Ok(())
    }

    fn code_block(&mut self, code: &str) -> ExportResult<()> {
        let pen = Pen {
            color: TEXT,
            ..Pen::code()
        };
        let line_height = pen.line_height();
        let pad = px(CELL_PADDING);
        let lines: Vec<&str> = code.trim_end_matches('\n').lines().collect();

        let available = ((self.bottom - self.y - pad * 2) / line_height).max(0) as usize;
        let shown = lines.len().min(available);
        if shown < lines.len() {
            self.full = true;
        }
        if shown == 0 {
            return Ok(());
        }

        let bottom = self.y + pad * 2 + line_height * shown as i32;
        self.fill((self.left, self.y), (self.right, bottom), CODE_FILL)?;
        let mut y = self.y + pad;
        for line in &lines[..shown] {
            // Long lines are clipped at the canvas edge
            self.text(line, &pen, self.left + pad, y)?;
            y += line_height;
        }
        self.y = bottom;
        Ok(())
    }

    /// Shorten `text` with an ellipsis until it fits in `width`.
    fn fit(&self, text: &str, pen: &Pen, width: i32) -> ExportResult<String> {
        if self.measure(text, pen)? <= width {
            return Ok(text.to_string());
        }
        let mut chars: Vec<char> = text.chars().collect();
        while !chars.is_empty() {
            chars.pop();
            let candidate: String = chars.iter().collect::<String>() + "…";
            if self.measure(&candidate, pen)? <= width {
                return Ok(candidate);
            }
        }
        Ok(String::new())
    }

    fn table(&mut self, header: &[Cell], rows: &[Vec<Cell>]) -> ExportResult<()> {
        let columns = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return Ok(());
        }
        let column_width = (self.right - self.left) / columns as i32;
        let pad = px(CELL_PADDING);
        let row_height = Pen::body().line_height() + pad;

        let header_row = (!header.is_empty()).then_some(header);
        for (i, row) in header_row.into_iter().chain(rows.iter().map(Vec::as_slice)).enumerate() {
            if !self.room(row_height) {
                return Ok(());
            }
            let is_header = i == 0 && header_row.is_some();
            let pen = Pen {
                bold: is_header,
                ..Pen::body()
            };
            if is_header {
                self.fill((self.left, self.y), (self.right, self.y + row_height), HEADER_FILL)?;
            }
            for column in 0..columns {
                let text = row.get(column).map(|c| inline_text(c)).unwrap_or_default();
                let x = self.left + column_width * column as i32;
                let text = self.fit(text.trim(), &pen, column_width - pad * 2)?;
                self.text(&text, &pen, x + pad, self.y + pad / 2)?;
            }
            self.y += row_height;
            self.hline(self.left, self.right, self.y, BORDER)?;
        }
        Ok(())
    }
}
