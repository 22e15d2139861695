//! Storage layer for TaskDesk
//!
//! Configuration lives in a TOML file; the bearer token in the
//! `TASKDESK_TOKEN` environment variable or the OS keyring.

use crate::error::StorageError;

pub mod config;
pub mod credentials;

type Result<T> = std::result::Result<T, StorageError>;
