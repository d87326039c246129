//! Markdown document model
//!
//! Model responses are parsed once with `pulldown-cmark` into a flat list of
//! [`Block`]s. Every export renderer walks this model instead of re-scanning
//! the markdown text with its own rules.
//!
//! Nested lists are flattened into [`Block::ListItem`]s carrying their depth.
//! Raw HTML is reduced to its text content.

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;

/// Matches any HTML tag
static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?s)<[^>]*>").expect("Hard-coded regex pattern should be valid")
});

/// Remove HTML tags, keeping the text between them.
pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

// ============================================================================
// Model
// ============================================================================

/// Character styling of an inline run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Style {
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text { text: String, style: Style },
    Code(String),
    LineBreak,
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            style: Style::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Number(u64),
}

/// A table cell's inline content
pub type Cell = Vec<Inline>;

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    Quote(Vec<Inline>),
    ListItem {
        depth: usize,
        marker: ListMarker,
        content: Vec<Inline>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Table { header: Vec<Cell>, rows: Vec<Vec<Cell>> },
    Rule,
}

/// Parsed markdown
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// Flatten inline runs to plain text; line breaks become newlines.
pub fn inline_text(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text { text, .. } => out.push_str(text),
            Inline::Code(code) => out.push_str(code),
            Inline::LineBreak => out.push('\n'),
        }
    }
    out
}

impl Document {
    pub fn parse(markdown: &str) -> Self {
        DocumentBuilder::default().build(markdown)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every table as plain-text rows, header row first
    pub fn tables(&self) -> Vec<Vec<Vec<String>>> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Table { header, rows } => {
                    let flatten = |cells: &[Cell]| -> Vec<String> {
                        cells.iter().map(|c| inline_text(c).trim().to_string()).collect()
                    };
                    let mut table: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
                    if !header.is_empty() {
                        table.push(flatten(header));
                    }
                    table.extend(rows.iter().map(|row| flatten(row)));
                    Some(table)
                }
                _ => None,
            })
            .collect()
    }

    /// Plain text of each non-table block, in order
    pub fn text_blocks(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { content, .. }
                | Block::Paragraph(content)
                | Block::Quote(content)
                | Block::ListItem { content, .. } => Some(inline_text(content)),
                Block::CodeBlock { code, .. } => Some(code.trim_end().to_string()),
                Block::Table { .. } | Block::Rule => None,
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Default)]
struct TableState {
    header: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
    row: Vec<Cell>,
}

#[derive(Default)]
struct DocumentBuilder {
    blocks: Vec<Block>,
    inlines: Vec<Inline>,
    style: Style,
    strong_depth: usize,
    emphasis_depth: usize,
    strike_depth: usize,
    heading: Option<u8>,
    quote_depth: usize,
    /// Next number of each open list, innermost last
    lists: Vec<Option<u64>>,
    /// Marker of each open item, innermost last
    items: Vec<ListMarker>,
    code: Option<(Option<String>, String)>,
    table: Option<TableState>,
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

impl DocumentBuilder {
    fn build(mut self, markdown: &str) -> Document {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        for event in Parser::new_ext(markdown, options) {
            self.event(event);
        }
        self.flush_item();
        self.flush_paragraph();
        Document {
            blocks: self.blocks,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match &mut self.code {
                Some((_, code)) => code.push_str(&text),
                None => self.push_text(&text),
            },
            Event::Code(code) => self.inlines.push(Inline::Code(code.to_string())),
            Event::Html(html) | Event::InlineHtml(html) => {
                let text = strip_html(&html);
                if !text.trim().is_empty() {
                    self.push_text(text.trim_end_matches('\n'));
                }
            }
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.inlines.push(Inline::LineBreak),
            Event::Rule => {
                self.flush_paragraph();
                self.blocks.push(Block::Rule);
            }
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(label) => self.push_text(&format!("[{}]", label)),
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_paragraph();
                self.heading = Some(heading_level(level));
            }
            Tag::BlockQuote => self.quote_depth += 1,
            Tag::CodeBlock(kind) => {
                self.flush_item();
                self.flush_paragraph();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => {
                        Some(lang.trim().to_string())
                    }
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => {
                // A nested list ends the text of its parent item
                self.flush_item();
                self.lists.push(start);
            }
            Tag::Item => {
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = ListMarker::Number(*next);
                        *next += 1;
                        marker
                    }
                    _ => ListMarker::Bullet,
                };
                self.items.push(marker);
            }
            Tag::Table(_) => {
                self.flush_paragraph();
                self.table = Some(TableState::default());
            }
            Tag::TableCell => self.inlines.clear(),
            Tag::Emphasis => {
                self.emphasis_depth += 1;
                self.update_style();
            }
            Tag::Strong => {
                self.strong_depth += 1;
                self.update_style();
            }
            Tag::Strikethrough => {
                self.strike_depth += 1;
                self.update_style();
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.items.is_empty() {
                    self.flush_paragraph();
                } else if !self.inlines.is_empty() {
                    // Loose list items hold several paragraphs
                    self.inlines.push(Inline::LineBreak);
                }
            }
            TagEnd::Heading(_) => {
                let content = std::mem::take(&mut self.inlines);
                let level = self.heading.take().unwrap_or(1);
                self.blocks.push(Block::Heading { level, content });
            }
            TagEnd::BlockQuote => {
                self.flush_paragraph();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    self.blocks.push(Block::CodeBlock { language, code });
                }
            }
            TagEnd::List(_) => {
                self.flush_item();
                self.lists.pop();
            }
            TagEnd::Item => {
                self.flush_item();
                self.items.pop();
            }
            TagEnd::HtmlBlock => self.flush_paragraph(),
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.header = std::mem::take(&mut table.row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.inlines);
                if let Some(table) = &mut self.table {
                    table.row.push(cell);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(Block::Table {
                        header: table.header,
                        rows: table.rows,
                    });
                }
            }
            TagEnd::Emphasis => {
                self.emphasis_depth = self.emphasis_depth.saturating_sub(1);
                self.update_style();
            }
            TagEnd::Strong => {
                self.strong_depth = self.strong_depth.saturating_sub(1);
                self.update_style();
            }
            TagEnd::Strikethrough => {
                self.strike_depth = self.strike_depth.saturating_sub(1);
                self.update_style();
            }
            _ => {}
        }
    }

    fn update_style(&mut self) {
        self.style = Style {
            strong: self.strong_depth > 0,
            emphasis: self.emphasis_depth > 0,
            strikethrough: self.strike_depth > 0,
        };
    }

    /// Append text, merging with the previous run when the style matches.
    fn push_text(&mut self, text: &str) {
        if let Some(Inline::Text { text: last, style }) = self.inlines.last_mut() {
            if *style == self.style {
                last.push_str(text);
                return;
            }
        }
        self.inlines.push(Inline::Text {
            text: text.to_string(),
            style: self.style,
        });
    }

    fn flush_paragraph(&mut self) {
        if self.inlines.is_empty() || self.table.is_some() {
            return;
        }
        let content = std::mem::take(&mut self.inlines);
        if self.quote_depth > 0 {
            self.blocks.push(Block::Quote(content));
        } else {
            self.blocks.push(Block::Paragraph(content));
        }
    }

    fn flush_item(&mut self) {
        let Some(&marker) = self.items.last() else {
            return;
        };
        if let Some(Inline::LineBreak) = self.inlines.last() {
            self.inlines.pop();
        }
        if self.inlines.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.inlines);
        self.blocks.push(Block::ListItem {
            depth: self.lists.len().saturating_sub(1),
            marker,
            content,
        });
        // Text after a nested list continues the item without a new number
        if let Some(top) = self.items.last_mut() {
            *top = ListMarker::Bullet;
        }
    }
}
