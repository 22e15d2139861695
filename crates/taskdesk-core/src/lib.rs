//! # taskdesk-core
//!
//! Core library for the TaskDesk task manager.
//!
//! The centrepiece is [`table`], a client-side data table: search, filter,
//! sort, paginate, select and show/hide columns over any [`table::Record`],
//! with async fetch/create/update/delete against a service and headless
//! controllers for each part of a table UI. The remaining layers bind it
//! to the TaskDesk REST API.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use taskdesk_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> taskdesk_core::Result<()> {
//!     let config = Config::load(None)?;
//!     let client = TaskDeskClient::new(config.get_url().unwrap_or_default())?;
//!
//!     let table = DataTable::shared(task_columns(), TableState::new());
//!     let remote = RemoteTable::new(table.clone(), Arc::new(TaskService::new(client)));
//!     remote.fetch(ListParams::default()).await;
//!
//!     table.set_search_query("login");
//!     println!("{} matching tasks", table.filtered_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │          Table Layer                │  State reducer, stores, controllers
//! ├─────────────────────────────────────┤
//! │           API Layer                 │  HTTP client, request/response models
//! ├─────────────────────────────────────┤
//! │          Core Layer                 │  Services, record bindings
//! ├─────────────────────────────────────┤
//! │        Storage Layer                │  Configuration, token persistence
//! ├─────────────────────────────────────┤
//! │         Utils Layer                 │  Validation, retry, logging, text
//! └─────────────────────────────────────┘
//! ```

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use taskdesk_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Result;
    pub use crate::error::AppError;

    pub use crate::api::client::TaskDeskClient;
    pub use crate::api::models::{Task, TaskInput, User, UserInput};

    pub use crate::core::records::{task_columns, user_columns};
    pub use crate::core::services::auth_service::AuthService;
    pub use crate::core::services::config_service::ConfigService;
    pub use crate::core::services::profile_service::ProfileService;
    pub use crate::core::services::task_service::TaskService;
    pub use crate::core::services::types::ListParams;
    pub use crate::core::services::user_service::UserService;

    pub use crate::storage::config::Config;

    pub use crate::table::{
        Completion, DataTable, Debouncer, RemoteTable, SharedStore, TableAction, TableState,
    };

    pub use crate::display::TableDisplay;
}

/// Client-side data table engine.
///
/// - [`table::engine`]: pure search, filter, sort and paginate
/// - [`table::state`]: the reducer behind every table
/// - [`table::store`]: local or shared backing with one facade
/// - [`table::remote`]: async service operations with last-issued-wins
/// - [`table::controllers`]: headless UI adapters
pub mod table;

/// Business logic layer - services and record bindings.
pub mod core;

/// Storage layer - configuration and token persistence.
///
/// - [`storage::config`]: TOML configuration
/// - [`storage::credentials`]: `TASKDESK_TOKEN` or OS keyring
pub mod storage;

/// Utilities layer - shared helpers.
pub mod utils;

/// API layer - TaskDesk HTTP client and data models.
///
/// - [`api::client`]: HTTP client with bearer authentication
/// - [`api::models`]: Request/response data structures
pub mod api;

/// Display layer - tables and progress output for the terminal.
pub mod display;

/// Error handling - hierarchical error system.
///
/// - Domain-specific error variants (API, Auth, Config, etc.)
/// - Severity levels (Critical, High, Medium, Low)
/// - Troubleshooting hints for common issues
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
