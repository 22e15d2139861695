pub mod progress;
pub mod table;

pub use progress::{OperationStatus, ProgressSpinner, StatusNotifier, display_status};
pub use table::TableDisplay;
