use crate::error::{AppError, CliError, ServiceError};

pub mod auth_service;
pub mod config_service;
pub mod profile_service;
pub mod task_service;
pub mod traits;
pub mod types;
pub mod user_service;

/// Attach a field name to a validation failure from [`crate::utils::validation`].
pub(crate) fn field_error(field: &str, error: AppError) -> ServiceError {
    let message = match error {
        AppError::Cli(CliError::InvalidArguments(message)) => message,
        other => other.to_string(),
    };
    ServiceError::Validation {
        field: field.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::validate_title;

    #[test]
    fn test_field_error_keeps_message() {
        let error = validate_title("  ").expect_err("blank title");
        let service_error = field_error("title", error);
        assert_eq!(service_error.user_message(), "title: Title cannot be empty");
    }
}
