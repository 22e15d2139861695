//! Client-side data table.
//!
//! Layers, leaf first:
//!
//! - `value`: the [`Record`] accessor trait, cell values, column descriptors
//! - `engine`: pure search, filter, sort and paginate over index vectors
//! - `selection`, `columns`: side state independent of the derived view
//! - `state`: the reducer that keeps everything consistent
//! - `store`: local or shared backing behind one [`DataTable`] facade
//! - `remote`: async service operations applied to a table
//! - `debounce`: trailing-edge timer for search input
//! - `controllers`: getters, handlers and config per UI surface

pub mod columns;
pub mod controllers;
pub mod debounce;
pub mod engine;
pub mod remote;
pub mod selection;
pub mod state;
pub mod store;
pub mod value;

pub use columns::ColumnVisibility;
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use engine::{FilterConfig, FilterValue, SortConfig, SortDirection};
pub use remote::{Completion, LogNotifier, Notice, NoticeLevel, Notifier, RemoteTable};
pub use selection::Selection;
pub use state::{OperationKind, Pagination, TableAction, TableState, reduce};
pub use store::{DataTable, LocalStore, SharedStore, TableStore};
pub use value::{CellValue, ColumnDescriptor, JsonRecord, Record};
