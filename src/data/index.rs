//! Inverted word index for repeated searches over the same rows.
//!
//! Building the index is a single pass over the selected columns; each query
//! then only touches words rather than every cell.

use crate::data::query::search_terms;
use crate::types::Row;
use std::collections::{BTreeMap, BTreeSet};

/// Word to row-index map built from lowercased, whitespace-tokenized cells.
///
/// Words are kept sorted, so two indexes over the same rows are identical.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    words: BTreeMap<String, BTreeSet<usize>>,
    row_count: usize,
}

impl SearchIndex {
    /// Index `rows`, restricted to `columns` when given.
    pub fn build(rows: &[Row], columns: Option<&[String]>) -> Self {
        let mut words: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

        for (index, row) in rows.iter().enumerate() {
            let mut add = |text: String| {
                for word in text.split_whitespace() {
                    words.entry(word.to_string()).or_default().insert(index);
                }
            };
            match columns {
                Some(cols) => cols
                    .iter()
                    .for_each(|c| add(row.cell(c).to_string().to_lowercase())),
                None => row
                    .iter()
                    .for_each(|(_, cell)| add(cell.to_string().to_lowercase())),
            }
        }

        tracing::debug!(rows = rows.len(), words = words.len(), "Built search index");
        Self {
            words,
            row_count: rows.len(),
        }
    }

    /// Row indices matching every term, in row order.
    ///
    /// A term matches a row when any indexed word of that row contains it.
    /// An empty query matches every row.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let terms = search_terms(query);
        if terms.is_empty() {
            return (0..self.row_count).collect();
        }

        let mut result: Option<BTreeSet<usize>> = None;
        for term in &terms {
            let matches: BTreeSet<usize> = self
                .words
                .iter()
                .filter(|(word, _)| word.contains(term.as_str()))
                .flat_map(|(_, rows)| rows.iter().copied())
                .collect();

            let narrowed = match result {
                Some(current) => current.intersection(&matches).copied().collect(),
                None => matches,
            };
            if narrowed.is_empty() {
                return Vec::new();
            }
            result = Some(narrowed);
        }

        result.map(|set| set.into_iter().collect()).unwrap_or_default()
    }

    /// Rows of `rows` selected by [`SearchIndex::search`]
    pub fn select<'a>(&self, rows: &'a [Row], query: &str) -> Vec<&'a Row> {
        self.search(query)
            .into_iter()
            .filter_map(|i| rows.get(i))
            .collect()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }
}
