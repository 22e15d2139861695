//! Backing stores for [`TableState`].
//!
//! A [`DataTable`] runs the same reducer over either backing:
//!
//! - [`LocalStore`]: owned by a single component, no synchronisation
//! - [`SharedStore`]: clonable handle shared across components and tasks
//!
//! Callers pick the backing when they build the table; nothing else changes.

use std::cell::RefCell;
use std::sync::{Arc, PoisonError, RwLock};

use super::columns::ColumnVisibility;
use super::engine::{FilterConfig, FilterValue, SortConfig};
use super::state::{Pagination, PendingOperations, TableAction, TableState};
use super::value::{ColumnDescriptor, Record};

/// Read access and action dispatch over a [`TableState`].
pub trait TableStore<R: Record> {
    /// Run `f` against the current state.
    fn read<T>(&self, f: impl FnOnce(&TableState<R>) -> T) -> T;

    /// Apply one action. Recomputation completes before this returns.
    fn dispatch(&self, action: TableAction<R>);
}

/// Single-owner store.
#[derive(Debug)]
pub struct LocalStore<R> {
    state: RefCell<TableState<R>>,
}

impl<R: Record> Default for LocalStore<R> {
    fn default() -> Self {
        Self::new(TableState::new())
    }
}

impl<R: Record> LocalStore<R> {
    pub fn new(state: TableState<R>) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn into_inner(self) -> TableState<R> {
        self.state.into_inner()
    }
}

impl<R: Record> TableStore<R> for LocalStore<R> {
    fn read<T>(&self, f: impl FnOnce(&TableState<R>) -> T) -> T {
        f(&self.state.borrow())
    }

    fn dispatch(&self, action: TableAction<R>) {
        self.state.borrow_mut().apply(action);
    }
}

/// Store shared between components, clonable and `Send` when `R` is.
///
/// A panic while holding the lock does not lose the state: the reducer never
/// leaves it half-updated, so a poisoned lock is recovered as-is.
#[derive(Debug)]
pub struct SharedStore<R> {
    state: Arc<RwLock<TableState<R>>>,
}

impl<R> Clone for SharedStore<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: Record> Default for SharedStore<R> {
    fn default() -> Self {
        Self::new(TableState::new())
    }
}

impl<R: Record> SharedStore<R> {
    pub fn new(state: TableState<R>) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

impl<R: Record> TableStore<R> for SharedStore<R> {
    fn read<T>(&self, f: impl FnOnce(&TableState<R>) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn dispatch(&self, action: TableAction<R>) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        guard.apply(action);
    }
}

/// Table facade: column descriptors plus a state store.
#[derive(Debug)]
pub struct DataTable<R, S> {
    store: S,
    columns: Arc<[ColumnDescriptor<R>]>,
}

impl<R, S: Clone> Clone for DataTable<R, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            columns: Arc::clone(&self.columns),
        }
    }
}

impl<R: Record> DataTable<R, LocalStore<R>> {
    pub fn local(columns: Vec<ColumnDescriptor<R>>, state: TableState<R>) -> Self {
        Self::new(LocalStore::new(state), columns)
    }
}

impl<R: Record> DataTable<R, SharedStore<R>> {
    pub fn shared(columns: Vec<ColumnDescriptor<R>>, state: TableState<R>) -> Self {
        Self::new(SharedStore::new(state), columns)
    }
}

impl<R: Record, S: TableStore<R>> DataTable<R, S> {
    pub fn new(store: S, columns: Vec<ColumnDescriptor<R>>) -> Self {
        Self {
            store,
            columns: columns.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn columns(&self) -> &[ColumnDescriptor<R>] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor<R>> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor<R>> {
        self.store
            .read(|state| state.column_visibility().visible_columns(&self.columns))
    }

    pub fn read<T>(&self, f: impl FnOnce(&TableState<R>) -> T) -> T {
        self.store.read(f)
    }

    pub fn dispatch(&self, action: TableAction<R>) {
        self.store.dispatch(action);
    }

    // === Setters ===

    pub fn set_data(&self, records: Vec<R>) {
        self.dispatch(TableAction::SetData(records));
    }

    pub fn add_item(&self, record: R) {
        self.dispatch(TableAction::AddItem(record));
    }

    pub fn update_item(&self, record: R) {
        self.dispatch(TableAction::UpdateItem(record));
    }

    pub fn remove_item(&self, id: impl Into<String>) {
        self.dispatch(TableAction::RemoveItem(id.into()));
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.dispatch(TableAction::SetSearchQuery(query.into()));
    }

    pub fn set_filters(&self, filters: FilterConfig) {
        self.dispatch(TableAction::SetFilters(filters));
    }

    pub fn set_filter(&self, key: impl Into<String>, value: Option<FilterValue>) {
        self.dispatch(TableAction::SetFilter {
            key: key.into(),
            value,
        });
    }

    pub fn set_sort_config(&self, sort: Option<SortConfig>) {
        self.dispatch(TableAction::SetSortConfig(sort));
    }

    /// Advance the sort cycle for `key`, ignoring columns marked unsortable.
    pub fn toggle_sort(&self, key: &str) {
        if self.column(key).is_some_and(|column| !column.sortable) {
            log::debug!("column '{}' is not sortable", key);
            return;
        }
        self.dispatch(TableAction::ToggleSort(key.to_string()));
    }

    pub fn set_current_page(&self, page: usize) {
        self.dispatch(TableAction::SetCurrentPage(page));
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.dispatch(TableAction::SetPageSize(page_size));
    }

    pub fn set_column_visibility(&self, visibility: ColumnVisibility) {
        self.dispatch(TableAction::SetColumnVisibility(visibility));
    }

    pub fn toggle_column(&self, key: impl Into<String>) {
        self.dispatch(TableAction::ToggleColumn(key.into()));
    }

    pub fn reset_filters(&self) {
        self.dispatch(TableAction::ResetFilters);
    }

    pub fn select_row(&self, id: impl Into<String>) {
        self.dispatch(TableAction::SelectRow(id.into()));
    }

    pub fn select_all_rows(&self) {
        self.dispatch(TableAction::SelectAllRows);
    }

    pub fn clear_selection(&self) {
        self.dispatch(TableAction::ClearSelection);
    }

    pub fn clear_error(&self) {
        self.dispatch(TableAction::ClearError);
    }

    pub fn invalidate_cache(&self) {
        self.dispatch(TableAction::InvalidateCache);
    }

    // === Getters ===

    pub fn len(&self) -> usize {
        self.read(|state| state.data().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.read(|state| state.get(id).cloned())
    }

    pub fn data(&self) -> Vec<R> {
        self.read(|state| state.data().to_vec())
    }

    pub fn page_rows(&self) -> Vec<R> {
        self.read(|state| state.page_rows().into_iter().cloned().collect())
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.read(TableState::page_ids)
    }

    pub fn filtered_count(&self) -> usize {
        self.read(TableState::filtered_count)
    }

    pub fn total_pages(&self) -> usize {
        self.read(TableState::total_pages)
    }

    pub fn pagination(&self) -> Pagination {
        self.read(TableState::pagination)
    }

    pub fn search_query(&self) -> String {
        self.read(|state| state.search_query().to_string())
    }

    pub fn filters(&self) -> FilterConfig {
        self.read(|state| state.filters().clone())
    }

    pub fn sort(&self) -> Option<SortConfig> {
        self.read(|state| state.sort().cloned())
    }

    pub fn has_active_filters(&self) -> bool {
        self.read(TableState::has_active_filters)
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.read(|state| state.selection().ids())
    }

    pub fn selected_rows(&self) -> Vec<R> {
        self.read(|state| state.selected_rows().into_iter().cloned().collect())
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.read(|state| state.is_selected(id))
    }

    pub fn column_visibility(&self) -> ColumnVisibility {
        self.read(|state| state.column_visibility().clone())
    }

    pub fn pending(&self) -> PendingOperations {
        self.read(TableState::pending)
    }

    pub fn is_loading(&self) -> bool {
        self.read(TableState::is_loading)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|state| state.error().map(str::to_string))
    }

    pub fn is_cache_valid(&self) -> bool {
        self.read(TableState::is_cache_valid)
    }
}
