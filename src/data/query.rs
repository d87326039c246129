//! In-memory search, filter, sort and pagination over rows.
//!
//! Everything here is a pure function of its inputs. Search and filter
//! return clones so results can be sorted and paginated independently of
//! the source dataset.

use crate::constants::SAMPLE_SIZE;
use crate::data::profile::infer_column_type;
use crate::types::{
    ColumnType, DataCell, FilterCondition, Page, Row, SearchFilter, SortConfig, SortDirection,
};
use std::cmp::Ordering;

/// Whitespace-split lowercase search terms of `query`
pub fn search_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Rows where every term is a substring of at least one selected column.
///
/// `columns = None` searches every column of each row. An empty query
/// matches every row.
pub fn search(rows: &[Row], query: &str, columns: Option<&[String]>) -> Vec<Row> {
    let terms = search_terms(query);
    if terms.is_empty() {
        return rows.to_vec();
    }

    rows.iter()
        .filter(|row| {
            let haystacks: Vec<String> = match columns {
                Some(cols) => cols.iter().map(|c| row.cell(c).to_string().to_lowercase()).collect(),
                None => row.iter().map(|(_, v)| v.to_string().to_lowercase()).collect(),
            };
            terms
                .iter()
                .all(|term| haystacks.iter().any(|h| h.contains(term.as_str())))
        })
        .cloned()
        .collect()
}

/// Rows satisfying every filter
pub fn filter(rows: &[Row], filters: &[SearchFilter]) -> Vec<Row> {
    rows.iter()
        .filter(|row| filters.iter().all(|f| matches_filter(row, f)))
        .cloned()
        .collect()
}

/// Evaluate one filter against one row.
pub fn matches_filter(row: &Row, filter: &SearchFilter) -> bool {
    let cell = row.cell(&filter.column);
    match &filter.condition {
        FilterCondition::Equals(expected) => cell == expected,
        FilterCondition::Contains(needle) => lowered(cell).contains(&needle.to_lowercase()),
        FilterCondition::StartsWith(prefix) => lowered(cell).starts_with(&prefix.to_lowercase()),
        FilterCondition::EndsWith(suffix) => lowered(cell).ends_with(&suffix.to_lowercase()),
        FilterCondition::Greater(bound) => cell.as_number().is_some_and(|n| n > *bound),
        FilterCondition::Less(bound) => cell.as_number().is_some_and(|n| n < *bound),
        FilterCondition::Between(low, high) => {
            cell.as_number().is_some_and(|n| n >= *low && n <= *high)
        }
        FilterCondition::In(options) => options.contains(cell),
    }
}

fn lowered(cell: &DataCell) -> String {
    cell.to_string().to_lowercase()
}

/// Stable sort by one column.
///
/// The comparison kind is decided once from the column's inferred type
/// (sampled like [`crate::data::analyze_structure`]).
pub fn sort(rows: &[Row], config: &SortConfig) -> Vec<Row> {
    let sample: Vec<&DataCell> = rows
        .iter()
        .take(SAMPLE_SIZE)
        .map(|row| row.cell(&config.column))
        .filter(|c| !c.is_empty())
        .collect();
    sort_with_type(rows, config, infer_column_type(&sample))
}

/// Stable sort by one column using an explicit comparison kind.
///
/// Empty values always sort last. Values that do not coerce to the column
/// type sort after those that do and compare as strings among themselves.
pub fn sort_with_type(rows: &[Row], config: &SortConfig, column_type: ColumnType) -> Vec<Row> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let (a, b) = (a.cell(&config.column), b.cell(&config.column));
        match (a.is_empty(), b.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = compare_cells(a, b, column_type);
                match config.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    });
    sorted
}

fn compare_cells(a: &DataCell, b: &DataCell, column_type: ColumnType) -> Ordering {
    match column_type {
        ColumnType::Number => compare_coerced(a.as_number(), b.as_number(), a, b, |x, y| {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }),
        ColumnType::Date => compare_coerced(a.as_date(), b.as_date(), a, b, |x, y| x.cmp(y)),
        // false before true
        ColumnType::Boolean => compare_coerced(a.as_bool(), b.as_bool(), a, b, |x, y| x.cmp(y)),
        ColumnType::String => compare_text(a, b),
    }
}

fn compare_coerced<T>(
    x: Option<T>,
    y: Option<T>,
    a: &DataCell,
    b: &DataCell,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (x, y) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(a, b),
    }
}

fn compare_text(a: &DataCell, b: &DataCell) -> Ordering {
    let (a, b) = (a.to_string(), b.to_string());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

/// One 1-indexed page of `items`. Page 0 is treated as page 1.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let current_page = page.max(1);
    let total_items = items.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };

    let start = (current_page - 1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    Page {
        items: &items[start..end],
        total_items,
        total_pages,
        current_page,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn people() -> Vec<Row> {
        vec![
            row! { "name" => "Alice Smith", "age" => 34, "city" => "NYC" },
            row! { "name" => "Bob Stone", "age" => 28, "city" => "NYC" },
            row! { "name" => "Carol Smith", "age" => "41", "city" => "Boston" },
            row! { "name" => "Dan", "age" => DataCell::Empty, "city" => "NYC" },
        ]
    }

    fn names(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r.cell("name").to_string()).collect()
    }

    #[test]
    fn test_search_terms_and_across_columns() {
        let rows = people();
        assert_eq!(names(&search(&rows, "smith", None)), vec!["Alice Smith", "Carol Smith"]);
        // Terms may match different columns, but every term must match
        assert_eq!(names(&search(&rows, "SMITH nyc", None)), vec!["Alice Smith"]);
        assert!(search(&rows, "smith chicago", None).is_empty());
        assert_eq!(search(&rows, "   ", None).len(), 4);
    }

    #[test]
    fn test_search_restricted_columns() {
        let rows = people();
        let cols = vec!["city".to_string()];
        assert!(search(&rows, "smith", Some(&cols)).is_empty());
        assert_eq!(search(&rows, "bos", Some(&cols)).len(), 1);
    }

    #[test]
    fn test_filter_conjunction() {
        let filters = vec![
            SearchFilter::new("age", FilterCondition::Greater(30.0)),
            SearchFilter::new("city", FilterCondition::Equals("NYC".into())),
        ];
        assert_eq!(names(&filter(&people(), &filters)), vec!["Alice Smith"]);
    }

    #[test]
    fn test_filter_operators() {
        let rows = people();
        let check = |condition: FilterCondition, column: &str| {
            names(&filter(&rows, &[SearchFilter::new(column, condition)]))
        };

        assert_eq!(check(FilterCondition::Contains("STONE".into()), "name"), vec!["Bob Stone"]);
        assert_eq!(check(FilterCondition::StartsWith("car".into()), "name"), vec!["Carol Smith"]);
        assert_eq!(check(FilterCondition::EndsWith("SMITH".into()), "name").len(), 2);
        assert_eq!(check(FilterCondition::Less(30.0), "age"), vec!["Bob Stone"]);
        assert_eq!(check(FilterCondition::Between(28.0, 34.0), "age").len(), 2);
        assert_eq!(
            check(FilterCondition::In(vec!["Boston".into(), "LA".into()]), "city"),
            vec!["Carol Smith"]
        );
        // Strict equality: 34 is not "34"
        assert!(check(FilterCondition::Equals("34".into()), "age").is_empty());
    }

    #[test]
    fn test_sort_nulls_last_both_directions() {
        let rows = vec![row! { "v" => 5 }, row! { "v" => DataCell::Empty }, row! { "v" => 1 }];

        let asc = sort(&rows, &SortConfig::asc("v"));
        let values: Vec<String> = asc.iter().map(|r| r.cell("v").to_string()).collect();
        assert_eq!(values, vec!["1", "5", ""]);

        let desc = sort(&rows, &SortConfig::desc("v"));
        let values: Vec<String> = desc.iter().map(|r| r.cell("v").to_string()).collect();
        assert_eq!(values, vec!["5", "1", ""]);
    }

    #[test]
    fn test_sort_numeric_text_numerically() {
        let rows = vec![row! { "v" => "10" }, row! { "v" => "9" }, row! { "v" => "100" }];
        let sorted = sort(&rows, &SortConfig::asc("v"));
        let values: Vec<String> = sorted.iter().map(|r| r.cell("v").to_string()).collect();
        assert_eq!(values, vec!["9", "10", "100"]);
    }

    #[test]
    fn test_sort_dates_and_strings() {
        let rows = vec![
            row! { "d" => "2024-03-01", "s" => "banana" },
            row! { "d" => "2023-12-25", "s" => "Apple" },
            row! { "d" => "2024-01-10", "s" => "cherry" },
        ];
        let by_date = sort(&rows, &SortConfig::asc("d"));
        assert_eq!(by_date[0].cell("d").to_string(), "2023-12-25");
        assert_eq!(by_date[2].cell("d").to_string(), "2024-03-01");

        let by_name = sort(&rows, &SortConfig::asc("s"));
        let values: Vec<String> = by_name.iter().map(|r| r.cell("s").to_string()).collect();
        assert_eq!(values, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let rows = vec![
            row! { "k" => 1, "id" => "a" },
            row! { "k" => 0, "id" => "b" },
            row! { "k" => 1, "id" => "c" },
        ];
        let sorted = sort_with_type(&rows, &SortConfig::asc("k"), ColumnType::Number);
        let ids: Vec<String> = sorted.iter().map(|r| r.cell("id").to_string()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_boolean_columns_sort_by_truth_value() {
        let rows = vec![
            row! { "flag" => "yes", "id" => "a" },
            row! { "flag" => "0", "id" => "b" },
            row! { "flag" => "", "id" => "c" },
            row! { "flag" => "TRUE", "id" => "d" },
            row! { "flag" => "no", "id" => "e" },
            row! { "flag" => "1", "id" => "f" },
        ];
        let ids = |sorted: Vec<Row>| -> Vec<String> {
            sorted.iter().map(|r| r.cell("id").to_string()).collect()
        };

        assert_eq!(ids(sort(&rows, &SortConfig::asc("flag"))), vec!["b", "e", "a", "d", "f", "c"]);
        assert_eq!(ids(sort(&rows, &SortConfig::desc("flag"))), vec!["a", "d", "f", "b", "e", "c"]);
    }

    #[test]
    fn test_paginate_boundaries() {
        let data: Vec<u32> = (1..=25).collect();

        let page = paginate(&data, 3, 10);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.total_items, 25);

        assert!(paginate(&data, 4, 10).items.is_empty());
        assert_eq!(paginate(&data, 0, 10).items, &data[..10]);
        assert_eq!(paginate(&data, 1, 0).total_pages, 0);
    }
}
