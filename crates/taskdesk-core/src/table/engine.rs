//! Filter / sort / paginate engine.
//!
//! Pure functions over a record slice. Derived views are index vectors into
//! the canonical records so that sorting never clones row data.
//! The pipeline order is fixed: search, then filters, then sort, then page slice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::{CellValue, Record};

/// Constraint for a single filter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Case-insensitive substring match.
    Text(String),
    /// Exact membership of the stringified field value.
    AnyOf(Vec<String>),
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.is_empty(),
            FilterValue::AnyOf(values) => values.is_empty(),
        }
    }
}

/// Field key to constraint. Missing keys impose no constraint.
pub type FilterConfig = BTreeMap<String, FilterValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Next sort state when the header of column `key` is activated.
///
/// Same column cycles ascending → descending → none; any other column starts ascending.
pub fn next_sort(current: Option<&SortConfig>, key: &str) -> Option<SortConfig> {
    match current {
        Some(sort) if sort.key == key => match sort.direction {
            SortDirection::Ascending => Some(SortConfig::descending(key)),
            SortDirection::Descending => None,
        },
        _ => Some(SortConfig::ascending(key)),
    }
}

/// Whether any field of `record` contains `query_lower` (already lowercased).
pub fn matches_search<R: Record>(record: &R, query_lower: &str) -> bool {
    record
        .values()
        .iter()
        .any(|value| value.to_string().to_lowercase().contains(query_lower))
}

/// Whether `record` satisfies every non-empty filter.
pub fn matches_filters<R: Record>(record: &R, filters: &FilterConfig) -> bool {
    filters
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .all(|(key, value)| {
            let field = record.field(key).unwrap_or_default().to_string();
            match value {
                FilterValue::AnyOf(allowed) => allowed.iter().any(|v| *v == field),
                FilterValue::Text(text) => field.to_lowercase().contains(&text.to_lowercase()),
            }
        })
}

/// Indices of records passing search and filters, in original order.
pub fn filter_indices<R: Record>(records: &[R], search: &str, filters: &FilterConfig) -> Vec<usize> {
    let query_lower = search.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| query_lower.is_empty() || matches_search(*record, &query_lower))
        .filter(|(_, record)| matches_filters(*record, filters))
        .map(|(index, _)| index)
        .collect()
}

/// Stable sort of `indices` by the sort key. Ties keep their relative order.
///
/// Missing and null values sort last in either direction.
pub fn sort_indices<R: Record>(records: &[R], indices: &mut [usize], sort: Option<&SortConfig>) {
    let Some(sort) = sort else {
        return;
    };
    let keys: Vec<CellValue> = records
        .iter()
        .map(|record| record.field(&sort.key).unwrap_or_default())
        .collect();
    indices.sort_by(|&a, &b| {
        let (left, right) = (&keys[a], &keys[b]);
        let ordering = left.compare(right);
        if left.is_null() || right.is_null() {
            return ordering;
        }
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Search, filter and sort in one pass.
pub fn process<R: Record>(
    records: &[R],
    search: &str,
    filters: &FilterConfig,
    sort: Option<&SortConfig>,
) -> Vec<usize> {
    let mut indices = filter_indices(records, search, filters);
    sort_indices(records, &mut indices, sort);
    indices
}

/// Number of pages for `total_items`, never less than 1.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size).max(1)
}

/// Clamp a 1-based page into `[1, total_pages]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// The `[(page-1)*size, page*size)` window of `items`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// A computed page of records.
#[derive(Debug)]
pub struct PageView<'r, R> {
    pub rows: Vec<&'r R>,
    pub filtered_count: usize,
    pub total_pages: usize,
    /// The page actually shown after clamping.
    pub page: usize,
}

/// Search → filter → sort → paginate, with page clamping.
pub fn run<'r, R: Record>(
    records: &'r [R],
    search: &str,
    filters: &FilterConfig,
    sort: Option<&SortConfig>,
    page: usize,
    page_size: usize,
) -> PageView<'r, R> {
    let indices = process(records, search, filters, sort);
    let pages = total_pages(indices.len(), page_size);
    let page = clamp_page(page, pages);
    let rows = paginate(&indices, page, page_size)
        .iter()
        .map(|&index| &records[index])
        .collect();
    PageView {
        rows,
        filtered_count: indices.len(),
        total_pages: pages,
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
        status: String,
        rank: i64,
        note: Option<String>,
    }

    impl Row {
        fn new(id: &str, status: &str, rank: i64) -> Self {
            Self {
                id: id.to_string(),
                status: status.to_string(),
                rank,
                note: None,
            }
        }
    }

    impl Record for Row {
        fn id(&self) -> &str {
            &self.id
        }

        fn field(&self, key: &str) -> Option<CellValue> {
            match key {
                "id" => Some(self.id.as_str().into()),
                "status" => Some(self.status.as_str().into()),
                "rank" => Some(self.rank.into()),
                "note" => Some(self.note.clone().into()),
                _ => None,
            }
        }

        fn values(&self) -> Vec<CellValue> {
            ["id", "status", "rank", "note"]
                .iter()
                .filter_map(|key| self.field(key))
                .collect()
        }
    }

    fn ids(records: &[Row], indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| records[i].id.clone()).collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            Row::new("1", "Todo", 3),
            Row::new("2", "Done", 1),
            Row::new("3", "Todo", 2),
        ]
    }

    #[test]
    fn test_empty_search_is_identity() {
        let records = sample();
        let indices = filter_indices(&records, "", &FilterConfig::new());
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_matches_any_field_case_insensitively() {
        let mut records = sample();
        records[1].note = Some("Blocked by QA".to_string());
        assert_eq!(ids(&records, &filter_indices(&records, "qa", &FilterConfig::new())), vec!["2"]);
        assert_eq!(ids(&records, &filter_indices(&records, "TODO", &FilterConfig::new())), vec!["1", "3"]);
        // numbers participate through their string form
        assert_eq!(ids(&records, &filter_indices(&records, "3", &FilterConfig::new())), vec!["1", "3"]);
    }

    #[test]
    fn test_list_filter_keeps_original_order() {
        let records = sample();
        let mut filters = FilterConfig::new();
        filters.insert("status".to_string(), FilterValue::AnyOf(vec!["Todo".to_string()]));
        assert_eq!(ids(&records, &filter_indices(&records, "", &filters)), vec!["1", "3"]);
    }

    #[test]
    fn test_list_filter_is_exact_membership() {
        let records = sample();
        let mut filters = FilterConfig::new();
        filters.insert("status".to_string(), FilterValue::AnyOf(vec!["todo".to_string()]));
        assert!(filter_indices(&records, "", &filters).is_empty());
    }

    #[test]
    fn test_text_filter_contains_and_empty_entries_ignored() {
        let records = sample();
        let mut filters = FilterConfig::new();
        filters.insert("status".to_string(), FilterValue::Text("on".to_string()));
        filters.insert("rank".to_string(), FilterValue::Text(String::new()));
        filters.insert("id".to_string(), FilterValue::AnyOf(vec![]));
        assert_eq!(ids(&records, &filter_indices(&records, "", &filters)), vec!["2"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let mut filters = FilterConfig::new();
        filters.insert("status".to_string(), FilterValue::Text("do".to_string()));
        let once: Vec<Row> = filter_indices(&records, "", &filters)
            .into_iter()
            .map(|i| records[i].clone())
            .collect();
        let twice: Vec<Row> = filter_indices(&once, "", &filters)
            .into_iter()
            .map(|i| once[i].clone())
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let records = vec![
            Row::new("a", "Todo", 1),
            Row::new("b", "Done", 1),
            Row::new("c", "Todo", 0),
            Row::new("d", "Done", 0),
        ];
        let mut indices: Vec<usize> = (0..records.len()).collect();
        sort_indices(&records, &mut indices, Some(&SortConfig::ascending("status")));
        assert_eq!(ids(&records, &indices), vec!["b", "d", "a", "c"]);

        let mut indices: Vec<usize> = (0..records.len()).collect();
        sort_indices(&records, &mut indices, Some(&SortConfig::descending("rank")));
        assert_eq!(ids(&records, &indices), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_sort_twice_equals_sort_once() {
        let records = vec![
            Row::new("a", "Todo", 2),
            Row::new("b", "Done", 1),
            Row::new("c", "Todo", 2),
        ];
        let sort = SortConfig::ascending("rank");
        let mut once: Vec<usize> = (0..records.len()).collect();
        sort_indices(&records, &mut once, Some(&sort));
        let sorted: Vec<Row> = once.iter().map(|&i| records[i].clone()).collect();
        let mut again: Vec<usize> = (0..sorted.len()).collect();
        sort_indices(&sorted, &mut again, Some(&sort));
        assert_eq!(again, vec![0, 1, 2]);
        assert_eq!(ids(&records, &once), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_with_nulls_and_mixed_kinds() {
        let mut records: Vec<Row> = (0..40)
            .map(|i| Row::new(&format!("r{i}"), "Todo", 0))
            .collect();
        for (i, record) in records.iter_mut().enumerate() {
            record.note = match i % 4 {
                0 => None,
                1 => Some(format!("n{}", i % 3)),
                2 => Some("same".to_string()),
                _ => Some("2026-03-05".to_string()),
            };
        }

        let mut ascending: Vec<usize> = (0..records.len()).collect();
        sort_indices(&records, &mut ascending, Some(&SortConfig::ascending("note")));
        let mut descending: Vec<usize> = (0..records.len()).collect();
        sort_indices(&records, &mut descending, Some(&SortConfig::descending("note")));

        for indices in [&ascending, &descending] {
            // nulls trail in original order
            let tail: Vec<usize> = indices[30..].to_vec();
            assert_eq!(tail, (0..40).step_by(4).collect::<Vec<usize>>());
            // tied rows keep their original order
            let same: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|&i| records[i].note.as_deref() == Some("same"))
                .collect();
            assert_eq!(same, (2..40).step_by(4).collect::<Vec<usize>>());
        }
        assert_eq!(records[ascending[0]].note.as_deref(), Some("2026-03-05"));
        assert_eq!(records[descending[0]].note.as_deref(), Some("same"));
    }

    #[test]
    fn test_sort_json_records_with_mixed_values() {
        use crate::table::value::JsonRecord;
        use serde_json::json;

        let raw = [json!(3), json!(null), json!("b"), json!(1), json!("a"), json!(null), json!(1)];
        let records: Vec<JsonRecord> = raw
            .iter()
            .enumerate()
            .filter_map(|(i, v)| JsonRecord::from_value(json!({"id": i.to_string(), "v": v})))
            .collect();
        let order = |sort: SortConfig| {
            let indices = process(&records, "", &FilterConfig::new(), Some(&sort));
            indices.iter().map(|&i| records[i].id().to_string()).collect::<Vec<_>>()
        };
        assert_eq!(order(SortConfig::ascending("v")), vec!["3", "6", "0", "4", "2", "1", "5"]);
        assert_eq!(order(SortConfig::descending("v")), vec!["2", "4", "0", "3", "6", "1", "5"]);
    }

    #[test]
    fn test_numeric_sort_is_not_lexical() {
        let records = vec![Row::new("x", "", 10), Row::new("y", "", 9)];
        let mut indices = vec![0, 1];
        sort_indices(&records, &mut indices, Some(&SortConfig::ascending("rank")));
        assert_eq!(ids(&records, &indices), vec!["y", "x"]);
    }

    #[test]
    fn test_sort_cycle() {
        let first = next_sort(None, "status");
        assert_eq!(first, Some(SortConfig::ascending("status")));
        let second = next_sort(first.as_ref(), "status");
        assert_eq!(second, Some(SortConfig::descending("status")));
        let third = next_sort(second.as_ref(), "status");
        assert_eq!(third, None);

        let switched = next_sort(second.as_ref(), "rank");
        assert_eq!(switched, Some(SortConfig::ascending("rank")));
    }

    #[test]
    fn test_total_pages_floor_and_clamp() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(5, 2), 3);
        assert_eq!(total_pages(4, 2), 2);
        assert_eq!(clamp_page(5, 3), 3);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 0), 1);
    }

    #[test]
    fn test_pages_concatenate_to_whole() {
        let items: Vec<u32> = (0..5).collect();
        let pages = total_pages(items.len(), 2);
        let rebuilt: Vec<u32> = (1..=pages)
            .flat_map(|page| paginate(&items, page, 2).to_vec())
            .collect();
        assert_eq!(rebuilt, items);
        assert_eq!(paginate(&items, 3, 2), &[4]);
        assert!(paginate(&items, 9, 2).is_empty());
    }

    #[test]
    fn test_run_clamps_requested_page() {
        let records: Vec<Row> = (1..=5).map(|i| Row::new(&i.to_string(), "Todo", i)).collect();
        let view = run(&records, "", &FilterConfig::new(), None, 5, 2);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.page, 3);
        assert_eq!(view.filtered_count, 5);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id, "5");
    }
}
