//! Controller adapters for table UI surfaces.
//!
//! Each controller exposes the same three groups regardless of where its state lives:
//!
//! - `getters()`: a snapshot of derived, read-only values
//! - `handlers()`: the callbacks a view attaches to its controls
//! - `config()`: options merged over defaults
//!
//! State is held in [`Binding`]s. A binding owns a local value, and may also
//! carry an external reader and a change callback. The external reader wins
//! for reads; the change callback fires on every write either way.

pub mod filter_dropdown;
pub mod header;
pub mod pagination;
pub mod row_actions;
pub mod toolbar;

pub use filter_dropdown::{
    FilterDropdownConfig, FilterDropdownController, FilterDropdownGetters, FilterDropdownOptions,
    FilterOption, OptionState,
};
pub use header::{FilterDefinition, HeaderConfig, HeaderController, HeaderGetters, HeaderOptions};
pub use pagination::{
    PageButton, PaginationConfig, PaginationController, PaginationGetters, PaginationOptions,
};
pub use row_actions::{
    CustomAction, DeleteState, RowActionItem, RowActionKind, RowActionsConfig,
    RowActionsController, RowActionsGetters, RowActionsOptions,
};
pub use toolbar::{ColumnToggle, ToolbarConfig, ToolbarController, ToolbarGetters, ToolbarOptions};

type Reader<'a, T> = Box<dyn Fn() -> T + 'a>;
type Callback<'a, T> = Box<dyn FnMut(&T) + 'a>;

/// A value that is either owned locally or mirrored from an external source.
pub struct Binding<'a, T> {
    local: T,
    external: Option<Reader<'a, T>>,
    on_change: Option<Callback<'a, T>>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Binding<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("local", &self.local)
            .field("external", &self.external.is_some())
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl<'a, T: Clone> Binding<'a, T> {
    pub fn local(initial: T) -> Self {
        Self {
            local: initial,
            external: None,
            on_change: None,
        }
    }

    /// Reads from `read`, reports writes to `on_change`.
    pub fn external(
        initial: T,
        read: impl Fn() -> T + 'a,
        on_change: impl FnMut(&T) + 'a,
    ) -> Self {
        Self::local(initial)
            .with_external(read)
            .with_on_change(on_change)
    }

    pub fn with_external(mut self, read: impl Fn() -> T + 'a) -> Self {
        self.external = Some(Box::new(read));
        self
    }

    pub fn with_on_change(mut self, on_change: impl FnMut(&T) + 'a) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    pub fn is_external(&self) -> bool {
        self.external.is_some()
    }

    pub fn get(&self) -> T {
        match &self.external {
            Some(read) => read(),
            None => self.local.clone(),
        }
    }

    pub fn set(&mut self, value: T) {
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&value);
        }
        self.local = value;
    }

    /// Derive the next value from the current one and write it.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.get());
        self.set(next);
    }
}

impl<T: Clone + Default> Default for Binding<'_, T> {
    fn default() -> Self {
        Self::local(T::default())
    }
}
