//! Generic filter dropdown: single or multi select over a fixed option list.

use super::Binding;
use crate::table::engine::FilterValue;
use crate::table::store::{DataTable, TableStore};
use crate::table::value::Record;

pub const DEFAULT_MAX_DISPLAY_ITEMS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// An option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterDropdownOptions {
    pub title: String,
    pub options: Vec<FilterOption>,
    pub multi_select: Option<bool>,
    pub max_display_items: Option<usize>,
    pub searchable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDropdownConfig {
    pub title: String,
    pub options: Vec<FilterOption>,
    pub multi_select: bool,
    pub max_display_items: usize,
    pub searchable: bool,
}

impl From<FilterDropdownOptions> for FilterDropdownConfig {
    fn from(options: FilterDropdownOptions) -> Self {
        let searchable = options.searchable.unwrap_or(options.options.len() > 8);
        Self {
            title: options.title,
            options: options.options,
            multi_select: options.multi_select.unwrap_or(true),
            max_display_items: options
                .max_display_items
                .unwrap_or(DEFAULT_MAX_DISPLAY_ITEMS)
                .max(1),
            searchable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionState {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDropdownGetters {
    pub display_text: String,
    pub selected: Vec<String>,
    pub selected_count: usize,
    pub has_selection: bool,
    pub is_open: bool,
    pub option_query: String,
    /// Options matching `option_query`, in configured order.
    pub visible_options: Vec<OptionState>,
}

pub struct FilterDropdownController<'a> {
    config: FilterDropdownConfig,
    selected: Binding<'a, Vec<String>>,
    open: Binding<'a, bool>,
    option_query: String,
}

impl<'a> FilterDropdownController<'a> {
    pub fn new(options: FilterDropdownOptions) -> Self {
        Self::with_binding(options, Binding::local(Vec::new()))
    }

    pub fn with_binding(options: FilterDropdownOptions, selected: Binding<'a, Vec<String>>) -> Self {
        Self {
            config: options.into(),
            selected,
            open: Binding::local(false),
            option_query: String::new(),
        }
    }

    pub fn with_open_binding(mut self, open: Binding<'a, bool>) -> Self {
        self.open = open;
        self
    }

    /// Bind the selection to `table`'s filter on `key`.
    pub fn for_table<R: Record, S: TableStore<R>>(
        table: &'a DataTable<R, S>,
        key: &str,
        options: FilterDropdownOptions,
    ) -> Self {
        let read_key = key.to_string();
        let write_key = key.to_string();
        let selected = Binding::external(
            Vec::new(),
            move || match table.filters().get(&read_key) {
                Some(FilterValue::AnyOf(values)) => values.clone(),
                Some(FilterValue::Text(text)) if !text.is_empty() => vec![text.clone()],
                _ => Vec::new(),
            },
            move |values: &Vec<String>| {
                let value = (!values.is_empty()).then(|| FilterValue::AnyOf(values.clone()));
                table.set_filter(write_key.clone(), value);
            },
        );
        Self::with_binding(options, selected)
    }

    pub fn config(&self) -> &FilterDropdownConfig {
        &self.config
    }

    fn label_for<'v>(&'v self, value: &'v str) -> &'v str {
        self.config
            .options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
            .unwrap_or(value)
    }

    /// Summary shown on the closed dropdown button.
    pub fn display_text(&self, selected: &[String]) -> String {
        match selected.len() {
            0 => self.config.title.clone(),
            1 => self.label_for(&selected[0]).to_string(),
            n if n <= self.config.max_display_items => selected
                .iter()
                .map(|value| self.label_for(value))
                .collect::<Vec<_>>()
                .join(", "),
            n => format!("{} selected", n),
        }
    }

    pub fn getters(&self) -> FilterDropdownGetters {
        let selected = self.selected.get();
        let query = self.option_query.to_lowercase();
        let visible_options = self
            .config
            .options
            .iter()
            .filter(|option| query.is_empty() || option.label.to_lowercase().contains(&query))
            .map(|option| OptionState {
                value: option.value.clone(),
                label: option.label.clone(),
                selected: selected.contains(&option.value),
            })
            .collect();

        FilterDropdownGetters {
            display_text: self.display_text(&selected),
            selected_count: selected.len(),
            has_selection: !selected.is_empty(),
            is_open: self.open.get(),
            option_query: self.option_query.clone(),
            visible_options,
            selected,
        }
    }

    pub fn handlers(&mut self) -> FilterDropdownHandlers<'_, 'a> {
        FilterDropdownHandlers { controller: self }
    }
}

pub struct FilterDropdownHandlers<'c, 'a> {
    controller: &'c mut FilterDropdownController<'a>,
}

impl FilterDropdownHandlers<'_, '_> {
    /// Toggle `value` in multi-select mode; replace or clear in single-select mode.
    pub fn on_select(&mut self, value: &str) {
        let multi_select = self.controller.config.multi_select;
        self.controller.selected.update(|current| {
            let already = current.iter().any(|v| v == value);
            match (multi_select, already) {
                (true, true) => current.iter().filter(|v| *v != value).cloned().collect(),
                (true, false) => {
                    let mut next = current.clone();
                    next.push(value.to_string());
                    next
                }
                (false, true) => Vec::new(),
                (false, false) => vec![value.to_string()],
            }
        });
        if !multi_select {
            self.controller.open.set(false);
        }
    }

    /// Select every option. Ignored in single-select mode.
    pub fn on_select_all(&mut self) {
        if !self.controller.config.multi_select {
            return;
        }
        let all = self
            .controller
            .config
            .options
            .iter()
            .map(|option| option.value.clone())
            .collect();
        self.controller.selected.set(all);
    }

    pub fn on_clear(&mut self) {
        self.controller.selected.set(Vec::new());
    }

    pub fn on_toggle_open(&mut self) {
        let open = self.controller.open.get();
        self.controller.open.set(!open);
        if open {
            self.controller.option_query.clear();
        }
    }

    pub fn on_close(&mut self) {
        self.controller.open.set(false);
        self.controller.option_query.clear();
    }

    pub fn on_option_search(&mut self, query: &str) {
        self.controller.option_query = query.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::state::TableState;
    use crate::table::value::{ColumnDescriptor, JsonRecord};
    use serde_json::json;
    use std::cell::RefCell;

    fn status_options(multi_select: bool) -> FilterDropdownOptions {
        FilterDropdownOptions {
            title: "Status".to_string(),
            options: vec![
                FilterOption::plain("Todo"),
                FilterOption::new("In Progress", "In progress"),
                FilterOption::plain("Done"),
            ],
            multi_select: Some(multi_select),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_text_progression() {
        let mut dropdown = FilterDropdownController::new(status_options(true));
        assert_eq!(dropdown.getters().display_text, "Status");

        dropdown.handlers().on_select("In Progress");
        assert_eq!(dropdown.getters().display_text, "In progress");

        dropdown.handlers().on_select("Todo");
        assert_eq!(dropdown.getters().display_text, "In progress, Todo");

        dropdown.handlers().on_select("Done");
        assert_eq!(dropdown.getters().display_text, "3 selected");
    }

    #[test]
    fn test_multi_select_toggles() {
        let mut dropdown = FilterDropdownController::new(status_options(true));
        dropdown.handlers().on_select("Todo");
        dropdown.handlers().on_select("Done");
        dropdown.handlers().on_select("Todo");
        assert_eq!(dropdown.getters().selected, vec!["Done"]);

        dropdown.handlers().on_select_all();
        assert_eq!(dropdown.getters().selected_count, 3);
        dropdown.handlers().on_clear();
        assert!(!dropdown.getters().has_selection);
    }

    #[test]
    fn test_single_select_replaces_and_clears() {
        let mut dropdown = FilterDropdownController::new(status_options(false));
        dropdown.handlers().on_toggle_open();
        dropdown.handlers().on_select("Todo");
        assert!(!dropdown.getters().is_open);

        dropdown.handlers().on_select("Done");
        assert_eq!(dropdown.getters().selected, vec!["Done"]);

        dropdown.handlers().on_select("Done");
        assert!(dropdown.getters().selected.is_empty());

        dropdown.handlers().on_select_all();
        assert!(dropdown.getters().selected.is_empty());
    }

    #[test]
    fn test_option_search_filters_visible_options() {
        let mut dropdown = FilterDropdownController::new(status_options(true));
        dropdown.handlers().on_option_search("do");
        let labels: Vec<String> = dropdown
            .getters()
            .visible_options
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, vec!["Todo", "Done"]);
    }

    #[test]
    fn test_external_callback_observes_local_changes() {
        let seen = RefCell::new(Vec::new());
        {
            let binding = Binding::local(Vec::new())
                .with_on_change(|values: &Vec<String>| seen.borrow_mut().push(values.len()));
            let mut dropdown =
                FilterDropdownController::with_binding(status_options(true), binding);
            dropdown.handlers().on_select("Todo");
            dropdown.handlers().on_select("Done");
        }
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_for_table_drives_filter() {
        let records: Vec<JsonRecord> = ["Todo", "Done", "Todo"]
            .iter()
            .enumerate()
            .filter_map(|(i, status)| {
                JsonRecord::from_value(json!({"id": (i + 1).to_string(), "status": status}))
            })
            .collect();
        let table = DataTable::local(
            vec![ColumnDescriptor::new("id", "ID"), ColumnDescriptor::new("status", "Status")],
            TableState::new().with_data(records),
        );

        let mut dropdown = FilterDropdownController::for_table(&table, "status", status_options(true));
        dropdown.handlers().on_select("Todo");
        assert_eq!(table.page_ids(), vec!["1", "3"]);
        assert_eq!(dropdown.getters().display_text, "Todo");

        table.reset_filters();
        assert_eq!(dropdown.getters().display_text, "Status");
        dropdown.handlers().on_select("Done");
        dropdown.handlers().on_select("Done");
        assert!(table.filters().is_empty());
    }
}
