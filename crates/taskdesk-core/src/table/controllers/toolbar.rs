//! Table toolbar: column visibility menu and the add button.

use super::Binding;
use crate::table::columns::ColumnVisibility;
use crate::table::store::{DataTable, TableStore};
use crate::table::value::Record;

#[derive(Debug, Clone, Default)]
pub struct ToolbarOptions {
    /// Keys whose toggle is shown disabled.
    pub exclude_from_toggle: Vec<String>,
    pub show_column_toggle: Option<bool>,
    pub show_add_button: Option<bool>,
    pub add_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarConfig {
    pub exclude_from_toggle: Vec<String>,
    pub show_column_toggle: bool,
    pub show_add_button: bool,
    pub add_label: String,
}

impl From<ToolbarOptions> for ToolbarConfig {
    fn from(options: ToolbarOptions) -> Self {
        Self {
            exclude_from_toggle: options.exclude_from_toggle,
            show_column_toggle: options.show_column_toggle.unwrap_or(true),
            show_add_button: options.show_add_button.unwrap_or(true),
            add_label: options.add_label.unwrap_or_else(|| "Add New".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnToggle {
    pub key: String,
    pub title: String,
    pub visible: bool,
    /// Column 0 and excluded keys cannot be toggled.
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarGetters {
    pub columns: Vec<ColumnToggle>,
    pub visible_count: usize,
    pub hidden_count: usize,
    /// The add button is configured on and has a handler.
    pub can_add: bool,
}

pub struct ToolbarController<'a> {
    config: ToolbarConfig,
    /// `(key, title)` of every column, in display order.
    columns: Vec<(String, String)>,
    visibility: Binding<'a, ColumnVisibility>,
    on_add: Option<Box<dyn FnMut() + 'a>>,
}

impl<'a> ToolbarController<'a> {
    pub fn new(columns: Vec<(String, String)>, options: ToolbarOptions) -> Self {
        Self::with_binding(columns, options, Binding::default())
    }

    pub fn with_binding(
        columns: Vec<(String, String)>,
        options: ToolbarOptions,
        visibility: Binding<'a, ColumnVisibility>,
    ) -> Self {
        Self {
            config: options.into(),
            columns,
            visibility,
            on_add: None,
        }
    }

    pub fn with_on_add(mut self, on_add: impl FnMut() + 'a) -> Self {
        self.on_add = Some(Box::new(on_add));
        self
    }

    pub fn for_table<R: Record, S: TableStore<R>>(
        table: &'a DataTable<R, S>,
        options: ToolbarOptions,
    ) -> Self {
        let columns = table
            .columns()
            .iter()
            .map(|column| (column.key.clone(), column.title.clone()))
            .collect();
        let visibility = Binding::external(
            ColumnVisibility::new(),
            move || table.column_visibility(),
            move |visibility: &ColumnVisibility| table.set_column_visibility(visibility.clone()),
        );
        Self::with_binding(columns, options, visibility)
    }

    pub fn config(&self) -> &ToolbarConfig {
        &self.config
    }

    fn is_toggle_disabled(&self, index: usize, key: &str) -> bool {
        index == 0 || self.config.exclude_from_toggle.iter().any(|k| k == key)
    }

    pub fn getters(&self) -> ToolbarGetters {
        let visibility = self.visibility.get();
        let columns: Vec<ColumnToggle> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, (key, title))| ColumnToggle {
                key: key.clone(),
                title: title.clone(),
                visible: index == 0 || visibility.is_visible(key),
                disabled: self.is_toggle_disabled(index, key),
            })
            .collect();
        let visible_count = columns.iter().filter(|column| column.visible).count();
        ToolbarGetters {
            hidden_count: columns.len() - visible_count,
            visible_count,
            columns,
            can_add: self.config.show_add_button && self.on_add.is_some(),
        }
    }

    pub fn handlers(&mut self) -> ToolbarHandlers<'_, 'a> {
        ToolbarHandlers { controller: self }
    }
}

pub struct ToolbarHandlers<'c, 'a> {
    controller: &'c mut ToolbarController<'a>,
}

impl ToolbarHandlers<'_, '_> {
    /// Flip a column's visibility. Disabled toggles are a no-op.
    pub fn on_toggle_column(&mut self, key: &str) {
        let Some(index) = self.controller.columns.iter().position(|(k, _)| k == key) else {
            log::debug!("unknown column '{}'", key);
            return;
        };
        if self.controller.is_toggle_disabled(index, key) {
            return;
        }
        self.controller.visibility.update(|current| {
            let mut next = current.clone();
            next.toggle(key);
            next
        });
    }

    pub fn on_show_all(&mut self) {
        self.controller.visibility.set(ColumnVisibility::new());
    }

    pub fn on_add(&mut self) {
        if !self.controller.config.show_add_button {
            return;
        }
        if let Some(on_add) = self.controller.on_add.as_mut() {
            on_add();
        }
    }
}
