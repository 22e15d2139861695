pub mod error_helpers;
pub mod logging;
pub mod retry;
pub mod text;
pub mod validation;
