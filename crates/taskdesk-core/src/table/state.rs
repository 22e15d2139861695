//! Table state container.
//!
//! [`TableState`] aggregates canonical records, query inputs, pagination,
//! selection, column visibility, remote-operation progress and the fetch cache.
//! All transitions go through [`TableState::apply`]; the derived view is
//! recomputed before `apply` returns whenever an input to the pipeline changed.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::columns::ColumnVisibility;
use super::engine::{self, FilterConfig, FilterValue, SortConfig};
use super::selection::Selection;
use super::value::Record;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_CACHE_EXPIRY: Duration = Duration::from_secs(300);

/// Kind of remote operation, each tracked with its own loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Fetch,
    Create,
    Update,
    Delete,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Fetch => "fetch",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }
}

/// In-flight counters per operation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingOperations {
    fetch: u32,
    create: u32,
    update: u32,
    delete: u32,
}

impl PendingOperations {
    fn slot(&mut self, kind: OperationKind) -> &mut u32 {
        match kind {
            OperationKind::Fetch => &mut self.fetch,
            OperationKind::Create => &mut self.create,
            OperationKind::Update => &mut self.update,
            OperationKind::Delete => &mut self.delete,
        }
    }

    pub fn count(&self, kind: OperationKind) -> u32 {
        match kind {
            OperationKind::Fetch => self.fetch,
            OperationKind::Create => self.create,
            OperationKind::Update => self.update,
            OperationKind::Delete => self.delete,
        }
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.count(kind) > 0
    }

    pub fn any(&self) -> bool {
        self.fetch + self.create + self.update + self.delete > 0
    }

    fn start(&mut self, kind: OperationKind) {
        *self.slot(kind) += 1;
    }

    fn finish(&mut self, kind: OperationKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_sub(1);
    }
}

/// 1-based pagination state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_items: 0,
        }
    }
}

impl Pagination {
    pub fn total_pages(&self) -> usize {
        engine::total_pages(self.total_items, self.page_size)
    }

    /// 1-based index of the first item on the current page, 0 when empty.
    pub fn start_item(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            (self.current_page - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last item on the current page, 0 when empty.
    pub fn end_item(&self) -> usize {
        (self.current_page * self.page_size).min(self.total_items)
    }
}

/// Every transition the state container accepts.
#[derive(Debug, Clone)]
pub enum TableAction<R> {
    SetData(Vec<R>),
    /// Insert at the head of the canonical records.
    AddItem(R),
    /// Replace the record sharing this record's id.
    UpdateItem(R),
    RemoveItem(String),
    SetSearchQuery(String),
    SetFilters(FilterConfig),
    /// Set or clear (`None`) a single filter key.
    SetFilter {
        key: String,
        value: Option<FilterValue>,
    },
    SetSortConfig(Option<SortConfig>),
    /// Advance the sort cycle for a column key.
    ToggleSort(String),
    SetCurrentPage(usize),
    SetPageSize(usize),
    SetColumnVisibility(ColumnVisibility),
    ToggleColumn(String),
    /// Clear search, filters and sort; back to page 1. Selection and visibility survive.
    ResetFilters,
    /// Toggle one row's selection.
    SelectRow(String),
    /// Toggle selection of every row on the current page.
    SelectAllRows,
    ClearSelection,
    OperationStarted(OperationKind),
    FetchFulfilled {
        records: Vec<R>,
        fetched_at: DateTime<Utc>,
    },
    CreateFulfilled(R),
    UpdateFulfilled(R),
    DeleteFulfilled(String),
    OperationFailed {
        kind: OperationKind,
        message: String,
    },
    /// A superseded operation completed; only its loading flag is released.
    OperationDiscarded(OperationKind),
    ClearError,
    InvalidateCache,
}

#[derive(Debug, Clone)]
pub struct TableState<R> {
    data: Vec<R>,
    view: Vec<usize>,
    search_query: String,
    filters: FilterConfig,
    sort: Option<SortConfig>,
    pagination: Pagination,
    selection: Selection,
    column_visibility: ColumnVisibility,
    pending: PendingOperations,
    error: Option<String>,
    last_fetch: Option<DateTime<Utc>>,
    cache_expiry: Duration,
}

impl<R: Record> Default for TableState<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `action` to `state`. Derived rows are consistent again on return.
pub fn reduce<R: Record>(state: &mut TableState<R>, action: TableAction<R>) {
    state.apply(action);
}

impl<R: Record> TableState<R> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            view: Vec::new(),
            search_query: String::new(),
            filters: FilterConfig::new(),
            sort: None,
            pagination: Pagination::default(),
            selection: Selection::new(),
            column_visibility: ColumnVisibility::new(),
            pending: PendingOperations::default(),
            error: None,
            last_fetch: None,
            cache_expiry: DEFAULT_CACHE_EXPIRY,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pagination.page_size = page_size.max(1);
        self
    }

    pub fn with_cache_expiry(mut self, cache_expiry: Duration) -> Self {
        self.cache_expiry = cache_expiry;
        self
    }

    pub fn with_data(mut self, data: Vec<R>) -> Self {
        self.apply(TableAction::SetData(data));
        self
    }

    /// The single transition function.
    pub fn apply(&mut self, action: TableAction<R>) {
        let mut data_changed = false;
        let mut query_changed = false;

        let completed = match &action {
            TableAction::CreateFulfilled(_) => Some(OperationKind::Create),
            TableAction::UpdateFulfilled(_) => Some(OperationKind::Update),
            TableAction::DeleteFulfilled(_) => Some(OperationKind::Delete),
            _ => None,
        };
        if let Some(kind) = completed {
            self.pending.finish(kind);
        }

        match action {
            TableAction::SetData(records) => {
                self.data = records;
                data_changed = true;
            }
            TableAction::AddItem(record) | TableAction::CreateFulfilled(record) => {
                self.data.retain(|existing| existing.id() != record.id());
                self.data.insert(0, record);
                data_changed = true;
            }
            TableAction::UpdateItem(record) | TableAction::UpdateFulfilled(record) => {
                if let Some(slot) = self.data.iter_mut().find(|r| r.id() == record.id()) {
                    *slot = record;
                    data_changed = true;
                }
            }
            TableAction::RemoveItem(id) | TableAction::DeleteFulfilled(id) => {
                let before = self.data.len();
                self.data.retain(|record| record.id() != id);
                self.selection.remove(&id);
                data_changed = self.data.len() != before;
            }
            TableAction::SetSearchQuery(query) => {
                self.search_query = query;
                query_changed = true;
            }
            TableAction::SetFilters(filters) => {
                self.filters = filters;
                query_changed = true;
            }
            TableAction::SetFilter { key, value } => {
                match value {
                    Some(value) if !value.is_empty() => {
                        self.filters.insert(key, value);
                    }
                    _ => {
                        self.filters.remove(&key);
                    }
                }
                query_changed = true;
            }
            TableAction::SetSortConfig(sort) => {
                self.sort = sort;
                query_changed = true;
            }
            TableAction::ToggleSort(key) => {
                self.sort = engine::next_sort(self.sort.as_ref(), &key);
                query_changed = true;
            }
            TableAction::SetCurrentPage(page) => {
                self.pagination.current_page =
                    engine::clamp_page(page, self.pagination.total_pages());
            }
            TableAction::SetPageSize(page_size) => {
                self.pagination.page_size = page_size.max(1);
                self.pagination.current_page = 1;
            }
            TableAction::SetColumnVisibility(visibility) => {
                self.column_visibility = visibility;
            }
            TableAction::ToggleColumn(key) => {
                self.column_visibility.toggle(&key);
            }
            TableAction::ResetFilters => {
                self.search_query.clear();
                self.filters.clear();
                self.sort = None;
                query_changed = true;
            }
            TableAction::SelectRow(id) => {
                self.selection.toggle_one(&id);
            }
            TableAction::SelectAllRows => {
                let page_ids = self.page_ids();
                self.selection.toggle_all_on_page(&page_ids);
            }
            TableAction::ClearSelection => {
                self.selection.clear();
            }
            TableAction::OperationStarted(kind) => {
                self.pending.start(kind);
                self.error = None;
            }
            TableAction::FetchFulfilled {
                records,
                fetched_at,
            } => {
                self.pending.finish(OperationKind::Fetch);
                self.data = records;
                self.last_fetch = Some(fetched_at);
                data_changed = true;
            }
            TableAction::OperationFailed { kind, message } => {
                self.pending.finish(kind);
                self.error = Some(message);
            }
            TableAction::OperationDiscarded(kind) => {
                self.pending.finish(kind);
            }
            TableAction::ClearError => {
                self.error = None;
            }
            TableAction::InvalidateCache => {
                self.last_fetch = None;
            }
        }

        if data_changed {
            self.prune_selection();
        }
        if query_changed {
            self.pagination.current_page = 1;
        }
        if data_changed || query_changed {
            self.recompute();
        }
    }

    fn prune_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let ids: HashSet<&str> = self.data.iter().map(|record| record.id()).collect();
        let pruned = self.selection.retain_existing(|id| ids.contains(id));
        if pruned > 0 {
            log::debug!("pruned {} selected ids no longer present", pruned);
        }
    }

    fn recompute(&mut self) {
        self.view = engine::process(
            &self.data,
            &self.search_query,
            &self.filters,
            self.sort.as_ref(),
        );
        self.pagination.total_items = self.view.len();
        self.pagination.current_page =
            engine::clamp_page(self.pagination.current_page, self.pagination.total_pages());
    }

    // === Canonical and derived data ===

    pub fn data(&self) -> &[R] {
        &self.data
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.data.iter().find(|record| record.id() == id)
    }

    /// Filtered and sorted records across all pages.
    pub fn filtered_rows(&self) -> impl Iterator<Item = &R> + '_ {
        self.view.iter().map(move |&index| &self.data[index])
    }

    /// Records on the current page.
    pub fn page_rows(&self) -> Vec<&R> {
        engine::paginate(
            &self.view,
            self.pagination.current_page,
            self.pagination.page_size,
        )
        .iter()
        .map(|&index| &self.data[index])
        .collect()
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.page_rows()
            .into_iter()
            .map(|record| record.id().to_string())
            .collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.view.len()
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    // === Query inputs ===

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_query.is_empty() || self.filters.values().any(|value| !value.is_empty())
    }

    // === Side state ===

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_rows(&self) -> Vec<&R> {
        self.data
            .iter()
            .filter(|record| self.selection.contains(record.id()))
            .collect()
    }

    pub fn column_visibility(&self) -> &ColumnVisibility {
        &self.column_visibility
    }

    // === Remote operation status ===

    pub fn pending(&self) -> PendingOperations {
        self.pending
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_pending(OperationKind::Fetch)
    }

    pub fn is_creating(&self) -> bool {
        self.pending.is_pending(OperationKind::Create)
    }

    pub fn is_updating(&self) -> bool {
        self.pending.is_pending(OperationKind::Update)
    }

    pub fn is_deleting(&self) -> bool {
        self.pending.is_pending(OperationKind::Delete)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // === Cache ===

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    pub fn cache_expiry(&self) -> Duration {
        self.cache_expiry
    }

    /// `now - last_fetch < cache_expiry`; never valid before the first fetch.
    pub fn is_cache_valid_at(&self, now: DateTime<Utc>) -> bool {
        let Some(last_fetch) = self.last_fetch else {
            return false;
        };
        match (now - last_fetch).to_std() {
            Ok(elapsed) => elapsed < self.cache_expiry,
            // last_fetch in the future: clock moved backwards, treat as fresh
            Err(_) => true,
        }
    }

    pub fn is_cache_valid(&self) -> bool {
        self.is_cache_valid_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::engine::SortDirection;
    use crate::table::value::{CellValue, Record};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        status: String,
    }

    fn item(id: &str, status: &str) -> Item {
        Item {
            id: id.to_string(),
            status: status.to_string(),
        }
    }

    impl Record for Item {
        fn id(&self) -> &str {
            &self.id
        }

        fn field(&self, key: &str) -> Option<CellValue> {
            match key {
                "id" => Some(self.id.as_str().into()),
                "status" => Some(self.status.as_str().into()),
                _ => None,
            }
        }

        fn values(&self) -> Vec<CellValue> {
            vec![self.id.as_str().into(), self.status.as_str().into()]
        }
    }

    fn page_ids(state: &TableState<Item>) -> Vec<String> {
        state.page_ids()
    }

    fn five() -> TableState<Item> {
        TableState::new().with_page_size(2).with_data(vec![
            item("1", "Todo"),
            item("2", "Done"),
            item("3", "Todo"),
            item("4", "Done"),
            item("5", "Todo"),
        ])
    }

    #[test]
    fn test_set_data_recomputes_view() {
        let state = five();
        assert_eq!(state.filtered_count(), 5);
        assert_eq!(state.total_pages(), 3);
        assert_eq!(page_ids(&state), vec!["1", "2"]);
    }

    #[test]
    fn test_page_request_is_clamped() {
        let mut state = five();
        state.apply(TableAction::SetCurrentPage(5));
        assert_eq!(state.pagination().current_page, 3);
        assert_eq!(page_ids(&state), vec!["5"]);

        state.apply(TableAction::SetCurrentPage(0));
        assert_eq!(state.pagination().current_page, 1);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let mut state: TableState<Item> = TableState::new();
        state.apply(TableAction::SetCurrentPage(4));
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.pagination().current_page, 1);
        assert_eq!(state.pagination().start_item(), 0);
    }

    #[test]
    fn test_query_changes_reset_page() {
        let mut state = five();
        state.apply(TableAction::SetCurrentPage(2));
        state.apply(TableAction::SetSearchQuery("todo".to_string()));
        assert_eq!(state.pagination().current_page, 1);
        assert_eq!(state.filtered_count(), 3);

        state.apply(TableAction::SetCurrentPage(2));
        state.apply(TableAction::ToggleSort("status".to_string()));
        assert_eq!(state.pagination().current_page, 1);

        state.apply(TableAction::SetCurrentPage(2));
        state.apply(TableAction::SetPageSize(1));
        assert_eq!(state.pagination().current_page, 1);
        assert_eq!(state.total_pages(), 3);
    }

    #[test]
    fn test_list_filter_scenario() {
        let mut state = TableState::new().with_data(vec![
            item("1", "Todo"),
            item("2", "Done"),
            item("3", "Todo"),
        ]);
        let mut filters = FilterConfig::new();
        filters.insert("status".to_string(), FilterValue::AnyOf(vec!["Todo".to_string()]));
        state.apply(TableAction::SetFilters(filters));
        assert_eq!(page_ids(&state), vec!["1", "3"]);
    }

    #[test]
    fn test_toggle_sort_cycle_through_reducer() {
        let mut state = five();
        state.apply(TableAction::SetSortConfig(Some(SortConfig::ascending("status"))));
        state.apply(TableAction::ToggleSort("status".to_string()));
        let sort = state.sort().cloned().expect("sort should be set");
        assert_eq!(sort.direction, SortDirection::Descending);
        state.apply(TableAction::ToggleSort("status".to_string()));
        assert!(state.sort().is_none());
    }

    #[test]
    fn test_reset_filters_keeps_selection_and_visibility() {
        let mut state = five();
        state.apply(TableAction::SelectRow("1".to_string()));
        state.apply(TableAction::ToggleColumn("status".to_string()));
        state.apply(TableAction::SetSearchQuery("done".to_string()));
        state.apply(TableAction::SetSortConfig(Some(SortConfig::descending("id"))));
        state.apply(TableAction::ResetFilters);

        assert_eq!(state.search_query(), "");
        assert!(state.filters().is_empty());
        assert!(state.sort().is_none());
        assert_eq!(state.pagination().current_page, 1);
        assert!(state.is_selected("1"));
        assert!(!state.column_visibility().is_visible("status"));
    }

    #[test]
    fn test_item_mutations() {
        let mut state = five();
        state.apply(TableAction::AddItem(item("6", "Todo")));
        assert_eq!(state.data()[0].id, "6");
        assert_eq!(state.filtered_count(), 6);

        state.apply(TableAction::UpdateItem(item("2", "Todo")));
        assert_eq!(state.get("2").map(|i| i.status.as_str()), Some("Todo"));

        state.apply(TableAction::UpdateItem(item("missing", "Todo")));
        assert_eq!(state.filtered_count(), 6);

        state.apply(TableAction::AddItem(item("3", "Done")));
        assert_eq!(state.data().iter().filter(|i| i.id == "3").count(), 1);
        assert_eq!(state.data()[0].status, "Done");
    }

    #[test]
    fn test_remove_prunes_selection() {
        let mut state = five();
        state.apply(TableAction::SelectRow("2".to_string()));
        state.apply(TableAction::SelectRow("3".to_string()));
        state.apply(TableAction::RemoveItem("2".to_string()));
        assert!(!state.is_selected("2"));
        assert!(state.is_selected("3"));

        state.apply(TableAction::SetData(vec![item("1", "Todo")]));
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_select_all_rows_uses_current_page() {
        let mut state = five();
        state.apply(TableAction::SetCurrentPage(2));
        state.apply(TableAction::SelectAllRows);
        assert_eq!(state.selection().ids(), vec!["3", "4"]);
        state.apply(TableAction::SelectAllRows);
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_removing_last_row_clamps_page() {
        let mut state = five();
        state.apply(TableAction::SetCurrentPage(3));
        state.apply(TableAction::RemoveItem("5".to_string()));
        assert_eq!(state.total_pages(), 2);
        assert_eq!(state.pagination().current_page, 2);
    }

    #[test]
    fn test_operation_flags_are_independent() {
        let mut state = five();
        state.apply(TableAction::OperationStarted(OperationKind::Update));
        state.apply(TableAction::OperationStarted(OperationKind::Delete));
        assert!(state.is_updating());
        assert!(state.is_deleting());
        assert!(!state.is_loading());

        state.apply(TableAction::DeleteFulfilled("4".to_string()));
        assert!(!state.is_deleting());
        assert!(state.is_updating());
        assert!(state.get("4").is_none());

        state.apply(TableAction::OperationFailed {
            kind: OperationKind::Update,
            message: "Task not found".to_string(),
        });
        assert!(!state.is_updating());
        assert_eq!(state.error(), Some("Task not found"));
        assert_eq!(state.filtered_count(), 4);
    }

    #[test]
    fn test_fetch_sets_cache_timestamp() {
        let mut state: TableState<Item> =
            TableState::new().with_cache_expiry(Duration::from_secs(60));
        let fetched_at = Utc::now();
        assert!(!state.is_cache_valid_at(fetched_at));

        state.apply(TableAction::OperationStarted(OperationKind::Fetch));
        assert!(state.is_loading());
        state.apply(TableAction::FetchFulfilled {
            records: vec![item("1", "Todo")],
            fetched_at,
        });
        assert!(!state.is_loading());
        assert!(state.is_cache_valid_at(fetched_at + chrono::Duration::seconds(30)));
        assert!(!state.is_cache_valid_at(fetched_at + chrono::Duration::seconds(60)));

        state.apply(TableAction::InvalidateCache);
        assert!(!state.is_cache_valid_at(fetched_at));
    }

    #[test]
    fn test_reduce_free_function() {
        let mut state = five();
        reduce(&mut state, TableAction::SetSearchQuery("done".to_string()));
        assert_eq!(state.filtered_count(), 2);
    }
}
