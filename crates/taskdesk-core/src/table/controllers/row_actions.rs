//! Per-row action menu with an optional delete confirmation step.

use super::Binding;
use crate::table::store::{DataTable, TableStore};
use crate::table::value::Record;

pub const DEFAULT_DELETE_CONFIRMATION: &str = "Are you sure you want to delete this item?";

type Handler<'a, R> = Box<dyn FnMut(&R) + 'a>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowActionKind {
    Edit,
    Duplicate,
    Delete,
    View,
    Download,
    Custom(String),
}

/// A caller-supplied action appended after the built-in ones.
pub struct CustomAction<'a, R> {
    pub id: String,
    pub label: String,
    pub destructive: bool,
    pub handler: Handler<'a, R>,
}

impl<'a, R> CustomAction<'a, R> {
    pub fn new(id: impl Into<String>, label: impl Into<String>, handler: impl FnMut(&R) + 'a) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            destructive: false,
            handler: Box::new(handler),
        }
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

pub struct RowActionsOptions<'a, R> {
    pub on_edit: Option<Handler<'a, R>>,
    pub on_duplicate: Option<Handler<'a, R>>,
    pub on_delete: Option<Handler<'a, R>>,
    pub on_view: Option<Handler<'a, R>>,
    pub on_download: Option<Handler<'a, R>>,
    pub show_edit: Option<bool>,
    pub show_duplicate: Option<bool>,
    pub show_delete: Option<bool>,
    pub show_view: Option<bool>,
    pub show_download: Option<bool>,
    pub confirm_delete: Option<bool>,
    pub delete_confirmation: Option<String>,
    pub custom_actions: Vec<CustomAction<'a, R>>,
}

impl<R> Default for RowActionsOptions<'_, R> {
    fn default() -> Self {
        Self {
            on_edit: None,
            on_duplicate: None,
            on_delete: None,
            on_view: None,
            on_download: None,
            show_edit: None,
            show_duplicate: None,
            show_delete: None,
            show_view: None,
            show_download: None,
            confirm_delete: None,
            delete_confirmation: None,
            custom_actions: Vec::new(),
        }
    }
}

impl<'a, R> RowActionsOptions<'a, R> {
    pub fn on_edit(mut self, handler: impl FnMut(&R) + 'a) -> Self {
        self.on_edit = Some(Box::new(handler));
        self
    }

    pub fn on_duplicate(mut self, handler: impl FnMut(&R) + 'a) -> Self {
        self.on_duplicate = Some(Box::new(handler));
        self
    }

    pub fn on_delete(mut self, handler: impl FnMut(&R) + 'a) -> Self {
        self.on_delete = Some(Box::new(handler));
        self
    }

    pub fn on_view(mut self, handler: impl FnMut(&R) + 'a) -> Self {
        self.on_view = Some(Box::new(handler));
        self
    }

    pub fn on_download(mut self, handler: impl FnMut(&R) + 'a) -> Self {
        self.on_download = Some(Box::new(handler));
        self
    }

    pub fn custom(mut self, action: CustomAction<'a, R>) -> Self {
        self.custom_actions.push(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActionsConfig {
    pub show_edit: bool,
    pub show_duplicate: bool,
    pub show_delete: bool,
    pub show_view: bool,
    pub show_download: bool,
    pub confirm_delete: bool,
    pub delete_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActionItem {
    pub kind: RowActionKind,
    pub label: String,
    pub destructive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteState<R> {
    Idle,
    Confirming(R),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActionsGetters {
    pub actions: Vec<RowActionItem>,
    pub is_open: bool,
    pub confirming_delete: bool,
    /// Confirmation prompt while a delete awaits confirmation.
    pub confirmation: Option<String>,
}

struct Handlers<'a, R> {
    edit: Option<Handler<'a, R>>,
    duplicate: Option<Handler<'a, R>>,
    delete: Option<Handler<'a, R>>,
    view: Option<Handler<'a, R>>,
    download: Option<Handler<'a, R>>,
}

pub struct RowActionsController<'a, R> {
    config: RowActionsConfig,
    handlers: Handlers<'a, R>,
    custom_actions: Vec<CustomAction<'a, R>>,
    open: Binding<'a, bool>,
    delete_state: DeleteState<R>,
}

impl<'a, R: Record> RowActionsController<'a, R> {
    pub fn new(options: RowActionsOptions<'a, R>) -> Self {
        let config = RowActionsConfig {
            show_edit: options.show_edit.unwrap_or(true),
            show_duplicate: options.show_duplicate.unwrap_or(true),
            show_delete: options.show_delete.unwrap_or(true),
            show_view: options.show_view.unwrap_or(true),
            show_download: options.show_download.unwrap_or(true),
            confirm_delete: options.confirm_delete.unwrap_or(true),
            delete_confirmation: options
                .delete_confirmation
                .unwrap_or_else(|| DEFAULT_DELETE_CONFIRMATION.to_string()),
        };
        Self {
            config,
            handlers: Handlers {
                edit: options.on_edit,
                duplicate: options.on_duplicate,
                delete: options.on_delete,
                view: options.on_view,
                download: options.on_download,
            },
            custom_actions: options.custom_actions,
            open: Binding::local(false),
            delete_state: DeleteState::Idle,
        }
    }

    pub fn with_open_binding(mut self, open: Binding<'a, bool>) -> Self {
        self.open = open;
        self
    }

    /// Without a caller-supplied delete handler, deleting removes the row from `table`.
    pub fn for_table<S: TableStore<R>>(
        table: &'a DataTable<R, S>,
        mut options: RowActionsOptions<'a, R>,
    ) -> Self {
        if options.on_delete.is_none() {
            options = options.on_delete(move |record: &R| table.remove_item(record.id()));
        }
        Self::new(options)
    }

    pub fn config(&self) -> &RowActionsConfig {
        &self.config
    }

    /// Built-in actions in fixed order, each shown only when enabled and handled,
    /// followed by custom actions.
    pub fn actions(&self) -> Vec<RowActionItem> {
        let builtin = [
            (RowActionKind::Edit, "Edit", self.config.show_edit, self.handlers.edit.is_some()),
            (
                RowActionKind::Duplicate,
                "Duplicate",
                self.config.show_duplicate,
                self.handlers.duplicate.is_some(),
            ),
            (
                RowActionKind::Delete,
                "Delete",
                self.config.show_delete,
                self.handlers.delete.is_some(),
            ),
            (RowActionKind::View, "View", self.config.show_view, self.handlers.view.is_some()),
            (
                RowActionKind::Download,
                "Download",
                self.config.show_download,
                self.handlers.download.is_some(),
            ),
        ];

        builtin
            .into_iter()
            .filter(|(_, _, shown, handled)| *shown && *handled)
            .map(|(kind, label, _, _)| RowActionItem {
                destructive: kind == RowActionKind::Delete,
                kind,
                label: label.to_string(),
            })
            .chain(self.custom_actions.iter().map(|action| RowActionItem {
                kind: RowActionKind::Custom(action.id.clone()),
                label: action.label.clone(),
                destructive: action.destructive,
            }))
            .collect()
    }

    pub fn delete_state(&self) -> &DeleteState<R> {
        &self.delete_state
    }

    pub fn getters(&self) -> RowActionsGetters {
        let confirming_delete = matches!(self.delete_state, DeleteState::Confirming(_));
        RowActionsGetters {
            actions: self.actions(),
            is_open: self.open.get(),
            confirming_delete,
            confirmation: confirming_delete.then(|| self.config.delete_confirmation.clone()),
        }
    }

    pub fn handlers(&mut self) -> RowActionsHandlers<'_, 'a, R> {
        RowActionsHandlers { controller: self }
    }
}

pub struct RowActionsHandlers<'c, 'a, R> {
    controller: &'c mut RowActionsController<'a, R>,
}

impl<R: Record> RowActionsHandlers<'_, '_, R> {
    pub fn on_toggle_menu(&mut self) {
        let open = self.controller.open.get();
        self.controller.open.set(!open);
    }

    pub fn on_close(&mut self) {
        self.controller.open.set(false);
    }

    /// Run `kind` against `record`. Returns false when the action is not available.
    ///
    /// Delete with confirmation enabled only enters the confirming state.
    pub fn on_action(&mut self, kind: &RowActionKind, record: &R) -> bool {
        let available = self.controller.actions().iter().any(|item| &item.kind == kind);
        if !available {
            return false;
        }
        self.controller.open.set(false);

        let controller = &mut *self.controller;
        let handler = match kind {
            RowActionKind::Edit => controller.handlers.edit.as_mut(),
            RowActionKind::Duplicate => controller.handlers.duplicate.as_mut(),
            RowActionKind::Delete if controller.config.confirm_delete => {
                controller.delete_state = DeleteState::Confirming(record.clone());
                return true;
            }
            RowActionKind::Delete => controller.handlers.delete.as_mut(),
            RowActionKind::View => controller.handlers.view.as_mut(),
            RowActionKind::Download => controller.handlers.download.as_mut(),
            RowActionKind::Custom(id) => controller
                .custom_actions
                .iter_mut()
                .find(|action| &action.id == id)
                .map(|action| &mut action.handler),
        };
        match handler {
            Some(handler) => {
                handler(record);
                true
            }
            None => false,
        }
    }

    /// Delete the record awaiting confirmation. Returns false when nothing was pending.
    pub fn on_confirm_delete(&mut self) -> bool {
        let DeleteState::Confirming(record) =
            std::mem::replace(&mut self.controller.delete_state, DeleteState::Idle)
        else {
            return false;
        };
        if let Some(handler) = self.controller.handlers.delete.as_mut() {
            handler(&record);
        }
        true
    }

    pub fn on_cancel_delete(&mut self) {
        self.controller.delete_state = DeleteState::Idle;
    }
}
