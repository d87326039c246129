//! Plain-text export.

use super::document::{Block, Document, ListMarker, inline_text};
use super::{ExportResult, ExportSource};
use serde_json::Value;

/// Content as text: markdown unchanged, JSON and rows pretty-printed.
pub fn render_text(source: &ExportSource) -> ExportResult<String> {
    Ok(match source {
        ExportSource::Markdown(text) => text.clone(),
        ExportSource::Rows(rows) => serde_json::to_string_pretty(rows)?,
        ExportSource::Json(Value::String(s)) => s.clone(),
        ExportSource::Json(value @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string_pretty(value)?
        }
        ExportSource::Json(value) => value.to_string(),
    })
}

/// Render a document as readable text without markdown syntax.
///
/// Blocks are separated by blank lines, list items by single newlines, and
/// table cells by tabs.
pub fn render_plain(doc: &Document) -> String {
    let mut out = String::new();
    let mut previous_was_item = false;

    for block in &doc.blocks {
        let is_item = matches!(block, Block::ListItem { .. });
        if !out.is_empty() {
            out.push_str(if is_item && previous_was_item { "\n" } else { "\n\n" });
        }
        previous_was_item = is_item;

        match block {
            Block::Heading { content, .. } | Block::Paragraph(content) => {
                out.push_str(&inline_text(content));
            }
            Block::Quote(content) => out.push_str(&inline_text(content)),
            Block::ListItem { depth, marker, content } => {
                out.push_str(&"  ".repeat(*depth));
                match marker {
                    ListMarker::Bullet => out.push_str("• "),
                    ListMarker::Number(n) => out.push_str(&format!("{}. ", n)),
                }
                out.push_str(&inline_text(content));
            }
            Block::CodeBlock { code, .. } => out.push_str(code.trim_end_matches('\n')),
            Block::Table { .. } => {
                let rows: Vec<String> = doc_table_rows(block).iter().map(|r| r.join("\t")).collect();
                out.push_str(&rows.join("\n"));
            }
            Block::Rule => out.push_str("----------"),
        }
    }

    out
}

fn doc_table_rows(block: &Block) -> Vec<Vec<String>> {
    let Block::Table { header, rows } = block else {
        return Vec::new();
    };
    std::iter::once(header)
        .filter(|h| !h.is_empty())
        .chain(rows.iter())
        .map(|row| row.iter().map(|cell| inline_text(cell).trim().to_string()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use serde_json::json;

    #[test]
    fn test_markdown_passes_through() {
        let md = "# Title\n\n**bold**";
        assert_eq!(render_text(&ExportSource::from(md)).unwrap(), md);
    }

    #[test]
    fn test_json_is_pretty_printed() {
        let text = render_text(&ExportSource::Json(json!({"a": [1, 2]}))).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
        assert_eq!(render_text(&ExportSource::Json(json!(42))).unwrap(), "42");
        assert_eq!(render_text(&ExportSource::Json(json!("hi"))).unwrap(), "hi");

        let rows = vec![row! { "x" => 1 }];
        assert_eq!(render_text(&ExportSource::Rows(rows)).unwrap(), "[\n  {\n    \"x\": 1\n  }\n]");
    }

    #[test]
    fn test_plain_rendering() {
        let doc = Document::parse("## Summary\n\nTotal is **42**.\n\n- north\n- south\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(
            render_plain(&doc),
            "Summary\n\nTotal is 42.\n\n• north\n• south\n\na\tb\n1\t2"
        );
    }
}
