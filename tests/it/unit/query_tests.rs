//! Unit tests for search, filter, sort, pagination and the search index.

use crate::helpers::sales_rows;
use datachat::data::{SearchIndex, filter, paginate, search, sort};
use datachat::types::{DataCell, FilterCondition, SearchFilter, SortConfig};

fn column(rows: &[datachat::types::Row], name: &str) -> Vec<String> {
    rows.iter().map(|r| r.cell(name).to_string()).collect()
}

#[test]
fn test_pagination_last_partial_page() {
    let items: Vec<u32> = (0..25).collect();
    let page = paginate(&items, 3, 10);
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_items, 25);
    assert_eq!(page.items[0], 20);

    assert!(paginate(&items, 4, 10).items.is_empty());
}

#[test]
fn test_filters_are_conjunctive() {
    let rows = sales_rows();
    let north = SearchFilter::new("region", FilterCondition::Equals(DataCell::from("north")));
    let many = SearchFilter::new("units", FilterCondition::Greater(5.0));

    let both = filter(&rows, &[north.clone(), many.clone()]);
    let north_only = filter(&rows, &[north]);
    let many_only = filter(&rows, &[many]);

    assert_eq!(column(&both, "units"), vec!["12", "9"]);
    assert!(both.iter().all(|r| north_only.contains(r) && many_only.contains(r)));
}

#[test]
fn test_text_operators_ignore_case() {
    let rows = sales_rows();
    let hits = filter(
        &rows,
        &[SearchFilter::new("note", FilterCondition::Contains("PRIORITY".into()))],
    );
    assert_eq!(column(&hits, "region"), vec!["east"]);
}

#[test]
fn test_sort_puts_empty_last_both_directions() {
    let rows = sales_rows();
    for config in [SortConfig::asc("units"), SortConfig::desc("units")] {
        let sorted = sort(&rows, &config);
        assert_eq!(sorted.last().unwrap().cell("units"), &DataCell::Empty);
    }
    assert_eq!(
        column(&sort(&rows, &SortConfig::desc("units")), "units")[..3],
        ["20", "14", "12"]
    );
}

#[test]
fn test_sort_dates_chronologically() {
    let rows = sales_rows();
    let sorted = sort(&rows, &SortConfig::desc("month"));
    assert_eq!(sorted[0].cell("month").to_string(), "2024-04-02");
    assert_eq!(sorted[7].cell("month").to_string(), "2024-01-15");
}

#[test]
fn test_index_agrees_with_linear_search() {
    let rows = sales_rows();
    let index = SearchIndex::build(&rows, None);

    for query in ["north", "NORTH true", "bulk", "2024-03", "nothing-here"] {
        let linear = search(&rows, query, None);
        let indexed: Vec<_> = index.select(&rows, query).into_iter().cloned().collect();
        assert_eq!(indexed, linear, "query {:?}", query);
    }
}
