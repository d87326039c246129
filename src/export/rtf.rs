//! RTF ("Word") export
//!
//! Produces a minimal RTF 1 document that word processors open directly:
//! a Times New Roman body font (`\f0`), Courier New for code (`\f1`) and a
//! two-entry color table. Non-ASCII text is written as `\uN?` escapes so
//! the file itself stays 7-bit.

use super::document::{Block, Document, Inline, ListMarker};
use super::text::render_text;
use super::{ExportResult, ExportSource};

const RTF_HEADER: &str = concat!(
    "{\\rtf1\\ansi\\ansicpg1252\\deff0\n",
    "{\\fonttbl{\\f0\\froman\\fcharset0 Times New Roman;}{\\f1\\fmodern\\fcharset0 Courier New;}}\n",
    "{\\colortbl;\\red0\\green0\\blue0;\\red37\\green99\\blue235;}\n",
    "\\f0\\fs24\n"
);

/// Twips per table column
const CELL_WIDTH: usize = 2400;

/// Twips of indent per list level
const LIST_INDENT: usize = 360;

/// Escape text for an RTF body.
pub fn escape_rtf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\t' => out.push_str("\\tab "),
            '\n' => out.push_str("\\line "),
            '\r' => {}
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // RTF takes signed 16-bit code units
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

fn heading_size(level: u8) -> u32 {
    match level {
        1 => 48,
        2 => 40,
        3 => 32,
        4 => 28,
        5 => 26,
        _ => 24,
    }
}

fn render_inlines(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text { text, style } => {
                let text = escape_rtf(text);
                let mut controls = String::new();
                if style.strong {
                    controls.push_str("\\b");
                }
                if style.emphasis {
                    controls.push_str("\\i");
                }
                if style.strikethrough {
                    controls.push_str("\\strike");
                }
                if controls.is_empty() {
                    out.push_str(&text);
                } else {
                    out.push_str(&format!("{{{} {}}}", controls, text));
                }
            }
            Inline::Code(code) => out.push_str(&format!("{{\\f1 {}}}", escape_rtf(code))),
            Inline::LineBreak => out.push_str("\\line "),
        }
    }
    out
}

fn render_table_row(cells: &[Vec<Inline>], columns: usize, bold: bool) -> String {
    let mut out = String::from("\\trowd\\trgaph108");
    for i in 1..=columns {
        out.push_str(&format!("\\clbrdrt\\brdrs\\clbrdrl\\brdrs\\clbrdrb\\brdrs\\clbrdrr\\brdrs\\cellx{}", i * CELL_WIDTH));
    }
    out.push('\n');
    for i in 0..columns {
        let text = cells.get(i).map(|c| render_inlines(c)).unwrap_or_default();
        if bold {
            out.push_str(&format!("\\pard\\intbl{{\\b {}}}\\cell\n", text));
        } else {
            out.push_str(&format!("\\pard\\intbl {}\\cell\n", text));
        }
    }
    out.push_str("\\row\n");
    out
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            out.push_str(&format!(
                "{{\\pard\\sb240\\sa120\\b\\fs{} {}\\par}}\n",
                heading_size(*level),
                render_inlines(content)
            ));
        }
        Block::Paragraph(content) => {
            out.push_str(&format!("{{\\pard\\sa120 {}\\par}}\n", render_inlines(content)));
        }
        Block::Quote(content) => {
            out.push_str(&format!(
                "{{\\pard\\li720\\sa120\\i\\cf2 {}\\par}}\n",
                render_inlines(content)
            ));
        }
        Block::ListItem { depth, marker, content } => {
            let indent = LIST_INDENT * (depth + 1);
            let bullet = match marker {
                ListMarker::Bullet => "\\bullet".to_string(),
                ListMarker::Number(n) => format!("{}.", n),
            };
            out.push_str(&format!(
                "{{\\pard\\li{}\\fi-{} {}\\tab {}\\par}}\n",
                indent,
                LIST_INDENT,
                bullet,
                render_inlines(content)
            ));
        }
        Block::CodeBlock { code, .. } => {
            let lines: Vec<String> = code.trim_end_matches('\n').lines().map(escape_rtf).collect();
            out.push_str(&format!(
                "{{\\pard\\sa120\\f1\\fs20 {}\\par}}\n",
                lines.join("\\line ")
            ));
        }
        Block::Table { header, rows } => {
            let columns = rows
                .iter()
                .map(Vec::len)
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0);
            if columns == 0 {
                return;
            }
            if !header.is_empty() {
                out.push_str(&render_table_row(header, columns, true));
            }
            for row in rows {
                out.push_str(&render_table_row(row, columns, false));
            }
            out.push_str("\\pard\\sa120\\par\n");
        }
        Block::Rule => out.push_str("{\\pard\\brdrb\\brdrs\\brdrw10\\brsp20 \\par}\n"),
    }
}

/// Render a parsed document as RTF.
pub fn document_to_rtf(doc: &Document) -> String {
    let mut out = String::from(RTF_HEADER);
    for block in &doc.blocks {
        render_block(block, &mut out);
    }
    out.push('}');
    out
}

/// Render `source` as RTF; JSON and rows are embedded as their text form.
pub fn render_rtf(source: &ExportSource) -> ExportResult<String> {
    let doc = match source {
        ExportSource::Markdown(text) => Document::parse(text),
        other => {
            let text = render_text(other)?;
            Document {
                blocks: vec![Block::CodeBlock {
                    language: None,
                    code: text,
                }],
            }
        }
    };
    let rtf = document_to_rtf(&doc);
    tracing::debug!(blocks = doc.blocks.len(), bytes = rtf.len(), "Rendered RTF");
    Ok(rtf)
}
