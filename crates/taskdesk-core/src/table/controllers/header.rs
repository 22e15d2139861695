//! Table header: search box, filter controls and reset.

use std::time::Duration;

use super::Binding;
use super::filter_dropdown::FilterOption;
use crate::table::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::table::engine::{FilterConfig, FilterValue};
use crate::table::store::{DataTable, SharedStore, TableStore};
use crate::table::value::Record;

/// A filter control shown in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefinition {
    pub key: String,
    pub title: String,
    pub options: Vec<FilterOption>,
    pub multi_select: bool,
}

impl FilterDefinition {
    pub fn new(key: impl Into<String>, title: impl Into<String>, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            options,
            multi_select: true,
        }
    }

    pub fn single_select(mut self) -> Self {
        self.multi_select = false;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeaderOptions {
    pub search_placeholder: Option<String>,
    pub filters: Vec<FilterDefinition>,
    pub show_search: Option<bool>,
    pub show_reset: Option<bool>,
    pub debounce: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderConfig {
    pub search_placeholder: String,
    pub filters: Vec<FilterDefinition>,
    pub show_search: bool,
    pub show_reset: bool,
    pub debounce: Duration,
}

impl From<HeaderOptions> for HeaderConfig {
    fn from(options: HeaderOptions) -> Self {
        Self {
            search_placeholder: options
                .search_placeholder
                .unwrap_or_else(|| "Search...".to_string()),
            filters: options.filters,
            show_search: options.show_search.unwrap_or(true),
            show_reset: options.show_reset.unwrap_or(true),
            debounce: options.debounce.unwrap_or(SEARCH_DEBOUNCE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderGetters {
    pub search_query: String,
    pub filters: FilterConfig,
    pub has_active_filters: bool,
    pub active_filter_count: usize,
    /// Show the reset control: configured on and something to reset.
    pub can_reset: bool,
}

pub struct HeaderController<'a> {
    config: HeaderConfig,
    search: Binding<'a, String>,
    filters: Binding<'a, FilterConfig>,
    on_reset: Option<Box<dyn FnMut() + 'a>>,
}

impl<'a> HeaderController<'a> {
    pub fn new(options: HeaderOptions) -> Self {
        Self::with_bindings(options, Binding::default(), Binding::default())
    }

    pub fn with_bindings(
        options: HeaderOptions,
        search: Binding<'a, String>,
        filters: Binding<'a, FilterConfig>,
    ) -> Self {
        Self {
            config: options.into(),
            search,
            filters,
            on_reset: None,
        }
    }

    /// Called after the header's own state is cleared by a reset.
    pub fn with_on_reset(mut self, on_reset: impl FnMut() + 'a) -> Self {
        self.on_reset = Some(Box::new(on_reset));
        self
    }

    /// Search and filters read from and write to `table` immediately.
    pub fn for_table<R: Record, S: TableStore<R>>(
        table: &'a DataTable<R, S>,
        options: HeaderOptions,
    ) -> Self {
        let search = Binding::external(
            String::new(),
            move || table.search_query(),
            move |query: &String| table.set_search_query(query.clone()),
        );
        let filters = Binding::external(
            FilterConfig::new(),
            move || table.filters(),
            move |filters: &FilterConfig| table.set_filters(filters.clone()),
        );
        Self::with_bindings(options, search, filters).with_on_reset(move || table.reset_filters())
    }

    /// Like [`HeaderController::for_table`], but the search text is held locally
    /// and reaches the table through `debouncer` once typing pauses.
    pub fn for_table_debounced<R>(
        table: &'a DataTable<R, SharedStore<R>>,
        debouncer: Debouncer,
        options: HeaderOptions,
    ) -> Self
    where
        R: Record + Send + Sync + 'static,
    {
        let shared = table.clone();
        let pending = debouncer.clone();
        let search = Binding::local(table.search_query()).with_on_change(move |query: &String| {
            let table = shared.clone();
            let query = query.clone();
            pending.call(move || async move { table.set_search_query(query) });
        });
        let filters = Binding::external(
            FilterConfig::new(),
            move || table.filters(),
            move |filters: &FilterConfig| table.set_filters(filters.clone()),
        );
        Self::with_bindings(options, search, filters).with_on_reset(move || {
            debouncer.cancel();
            table.reset_filters();
        })
    }

    pub fn config(&self) -> &HeaderConfig {
        &self.config
    }

    pub fn getters(&self) -> HeaderGetters {
        let search_query = self.search.get();
        let filters = self.filters.get();
        let active_filter_count = filters.values().filter(|value| !value.is_empty()).count();
        let has_active_filters = !search_query.is_empty() || active_filter_count > 0;
        HeaderGetters {
            can_reset: self.config.show_reset && has_active_filters,
            search_query,
            filters,
            has_active_filters,
            active_filter_count,
        }
    }

    pub fn handlers(&mut self) -> HeaderHandlers<'_, 'a> {
        HeaderHandlers { controller: self }
    }
}

pub struct HeaderHandlers<'c, 'a> {
    controller: &'c mut HeaderController<'a>,
}

impl HeaderHandlers<'_, '_> {
    pub fn on_search_change(&mut self, query: &str) {
        self.controller.search.set(query.to_string());
    }

    /// Set one filter; an empty or `None` value removes it.
    pub fn on_filter_change(&mut self, key: &str, value: Option<FilterValue>) {
        self.controller.filters.update(|current| {
            let mut next = current.clone();
            match value {
                Some(value) if !value.is_empty() => {
                    next.insert(key.to_string(), value);
                }
                _ => {
                    next.remove(key);
                }
            }
            next
        });
    }

    pub fn on_clear_filter(&mut self, key: &str) {
        self.on_filter_change(key, None);
    }

    pub fn on_reset(&mut self) {
        self.controller.search.set(String::new());
        self.controller.filters.set(FilterConfig::new());
        if let Some(on_reset) = self.controller.on_reset.as_mut() {
            on_reset();
        }
    }
}
