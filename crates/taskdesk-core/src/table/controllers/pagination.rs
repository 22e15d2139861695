//! Pagination bar: page navigation, page-size selector and the row summary.

use super::Binding;
use crate::table::engine;
use crate::table::store::{DataTable, TableStore};
use crate::table::value::Record;

pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];
pub const DEFAULT_MAX_PAGE_BUTTONS: usize = 7;

#[derive(Debug, Clone, Default)]
pub struct PaginationOptions {
    pub page_size_options: Option<Vec<usize>>,
    /// Most page buttons shown at once, including first and last.
    pub max_page_buttons: Option<usize>,
    pub show_page_size: Option<bool>,
    pub show_summary: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    pub page_size_options: Vec<usize>,
    pub max_page_buttons: usize,
    pub show_page_size: bool,
    pub show_summary: bool,
}

impl From<PaginationOptions> for PaginationConfig {
    fn from(options: PaginationOptions) -> Self {
        Self {
            page_size_options: options
                .page_size_options
                .filter(|sizes| !sizes.is_empty())
                .unwrap_or_else(|| DEFAULT_PAGE_SIZE_OPTIONS.to_vec()),
            max_page_buttons: options
                .max_page_buttons
                .unwrap_or(DEFAULT_MAX_PAGE_BUTTONS)
                .max(3),
            show_page_size: options.show_page_size.unwrap_or(true),
            show_summary: options.show_summary.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Page { number: usize, current: bool },
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationGetters {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub start_item: usize,
    pub end_item: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub page_buttons: Vec<PageButton>,
    pub summary: String,
}

/// Page buttons for `current` of `total`, collapsing long runs into ellipses.
///
/// The first and last pages are always shown; the remaining slots form a
/// window around `current` that slides against either end.
pub fn page_buttons(current: usize, total: usize, max_buttons: usize) -> Vec<PageButton> {
    let total = total.max(1);
    let current = engine::clamp_page(current, total);
    let page = |number: usize| PageButton::Page {
        number,
        current: number == current,
    };

    if total <= max_buttons {
        return (1..=total).map(page).collect();
    }

    let window = max_buttons.saturating_sub(2).max(1);
    let start = current
        .saturating_sub(window / 2)
        .clamp(2, total - window);
    let end = start + window - 1;

    let mut buttons = vec![page(1)];
    if start > 2 {
        buttons.push(PageButton::Ellipsis);
    }
    buttons.extend((start..=end).map(page));
    if end < total - 1 {
        buttons.push(PageButton::Ellipsis);
    }
    buttons.push(page(total));
    buttons
}

pub struct PaginationController<'a> {
    config: PaginationConfig,
    page: Binding<'a, usize>,
    page_size: Binding<'a, usize>,
    total_items: Box<dyn Fn() -> usize + 'a>,
}

impl<'a> PaginationController<'a> {
    pub fn new(total_items: usize, page_size: usize, options: PaginationOptions) -> Self {
        Self::with_bindings(
            options,
            Binding::local(1),
            Binding::local(page_size.max(1)),
            move || total_items,
        )
    }

    pub fn with_bindings(
        options: PaginationOptions,
        page: Binding<'a, usize>,
        page_size: Binding<'a, usize>,
        total_items: impl Fn() -> usize + 'a,
    ) -> Self {
        Self {
            config: options.into(),
            page,
            page_size,
            total_items: Box::new(total_items),
        }
    }

    pub fn for_table<R: Record, S: TableStore<R>>(
        table: &'a DataTable<R, S>,
        options: PaginationOptions,
    ) -> Self {
        let page = Binding::external(
            1,
            move || table.pagination().current_page,
            move |page: &usize| table.set_current_page(*page),
        );
        let page_size = Binding::external(
            table.pagination().page_size,
            move || table.pagination().page_size,
            move |size: &usize| table.set_page_size(*size),
        );
        Self::with_bindings(options, page, page_size, move || table.filtered_count())
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    fn total_pages(&self) -> usize {
        engine::total_pages((self.total_items)(), self.page_size.get())
    }

    pub fn getters(&self) -> PaginationGetters {
        let total_items = (self.total_items)();
        let page_size = self.page_size.get().max(1);
        let total_pages = engine::total_pages(total_items, page_size);
        let current_page = engine::clamp_page(self.page.get(), total_pages);
        let start_item = if total_items == 0 {
            0
        } else {
            (current_page - 1) * page_size + 1
        };
        let end_item = (current_page * page_size).min(total_items);

        PaginationGetters {
            current_page,
            page_size,
            total_items,
            total_pages,
            start_item,
            end_item,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
            page_buttons: page_buttons(current_page, total_pages, self.config.max_page_buttons),
            summary: format!(
                "Showing {} to {} of {} results",
                start_item, end_item, total_items
            ),
        }
    }

    pub fn handlers(&mut self) -> PaginationHandlers<'_, 'a> {
        PaginationHandlers { controller: self }
    }
}

pub struct PaginationHandlers<'c, 'a> {
    controller: &'c mut PaginationController<'a>,
}

impl PaginationHandlers<'_, '_> {
    /// Go to `page`, clamped into `[1, total_pages]`.
    pub fn on_page_change(&mut self, page: usize) {
        let page = engine::clamp_page(page, self.controller.total_pages());
        self.controller.page.set(page);
    }

    pub fn on_previous(&mut self) {
        let current = self.controller.page.get();
        self.on_page_change(current.saturating_sub(1));
    }

    pub fn on_next(&mut self) {
        let current = self.controller.page.get();
        self.on_page_change(current + 1);
    }

    pub fn on_first(&mut self) {
        self.on_page_change(1);
    }

    pub fn on_last(&mut self) {
        let last = self.controller.total_pages();
        self.on_page_change(last);
    }

    /// Change page size and return to page 1.
    pub fn on_page_size_change(&mut self, page_size: usize) {
        self.controller.page_size.set(page_size.max(1));
        self.controller.page.set(1);
    }

    /// Step to the next configured page size, wrapping around.
    pub fn on_cycle_page_size(&mut self) {
        let sizes = &self.controller.config.page_size_options;
        let current = self.controller.page_size.get();
        let next = sizes
            .iter()
            .copied()
            .find(|size| *size > current)
            .or_else(|| sizes.first().copied())
            .unwrap_or(current);
        self.on_page_size_change(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::state::TableState;
    use crate::table::value::{ColumnDescriptor, JsonRecord};
    use serde_json::json;

    fn numbers(buttons: &[PageButton]) -> Vec<String> {
        buttons
            .iter()
            .map(|button| match button {
                PageButton::Page { number, current: true } => format!("[{}]", number),
                PageButton::Page { number, .. } => number.to_string(),
                PageButton::Ellipsis => "...".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_page_buttons_short_range() {
        assert_eq!(numbers(&page_buttons(2, 3, 7)), vec!["1", "[2]", "3"]);
        assert_eq!(numbers(&page_buttons(1, 0, 7)), vec!["[1]"]);
    }

    #[test]
    fn test_page_buttons_window_slides() {
        assert_eq!(
            numbers(&page_buttons(1, 20, 7)),
            vec!["[1]", "2", "3", "4", "5", "6", "...", "20"]
        );
        assert_eq!(
            numbers(&page_buttons(10, 20, 7)),
            vec!["1", "...", "8", "9", "[10]", "11", "12", "...", "20"]
        );
        assert_eq!(
            numbers(&page_buttons(20, 20, 7)),
            vec!["1", "...", "15", "16", "17", "18", "19", "[20]"]
        );
    }

    #[test]
    fn test_local_navigation_and_summary() {
        let mut pagination = PaginationController::new(42, 10, PaginationOptions::default());
        let getters = pagination.getters();
        assert_eq!(getters.total_pages, 5);
        assert_eq!(getters.summary, "Showing 1 to 10 of 42 results");
        assert!(!getters.has_previous);

        pagination.handlers().on_last();
        let getters = pagination.getters();
        assert_eq!(getters.current_page, 5);
        assert_eq!(getters.summary, "Showing 41 to 42 of 42 results");
        assert!(!getters.has_next);

        pagination.handlers().on_next();
        assert_eq!(pagination.getters().current_page, 5);
        pagination.handlers().on_page_change(99);
        assert_eq!(pagination.getters().current_page, 5);

        pagination.handlers().on_page_size_change(25);
        let getters = pagination.getters();
        assert_eq!(getters.current_page, 1);
        assert_eq!(getters.total_pages, 2);
    }

    #[test]
    fn test_empty_summary() {
        let pagination = PaginationController::new(0, 10, PaginationOptions::default());
        let getters = pagination.getters();
        assert_eq!(getters.total_pages, 1);
        assert_eq!(getters.summary, "Showing 0 to 0 of 0 results");
    }

    #[test]
    fn test_cycle_page_size() {
        let mut pagination = PaginationController::new(500, 10, PaginationOptions::default());
        let sizes: Vec<usize> = (0..4)
            .map(|_| {
                pagination.handlers().on_cycle_page_size();
                pagination.getters().page_size
            })
            .collect();
        assert_eq!(sizes, vec![25, 50, 100, 10]);
    }

    #[test]
    fn test_for_table_drives_state() {
        let records: Vec<JsonRecord> = (1..=5)
            .filter_map(|i| JsonRecord::from_value(json!({"id": i})))
            .collect();
        let table = DataTable::local(
            vec![ColumnDescriptor::new("id", "ID")],
            TableState::new().with_page_size(2).with_data(records),
        );
        let mut pagination = PaginationController::for_table(&table, PaginationOptions::default());
        pagination.handlers().on_page_change(5);
        assert_eq!(table.pagination().current_page, 3);
        assert_eq!(table.page_ids(), vec!["5"]);

        pagination.handlers().on_previous();
        assert_eq!(table.page_ids(), vec!["3", "4"]);

        table.set_search_query("1");
        assert_eq!(pagination.getters().total_pages, 1);
        assert_eq!(pagination.getters().current_page, 1);
    }
}
