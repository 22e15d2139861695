//! Input validation for configuration values and command arguments.

use crate::error::CliError;

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    // Basic URL validation - must start with http:// or https://
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> crate::Result<()> {
    if email.is_empty() {
        return Err(CliError::InvalidArguments("Email cannot be empty".to_string()).into());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(CliError::InvalidArguments(format!(
            "Invalid email '{}': Email must have username and domain parts",
            email
        ))
        .into());
    }

    if !parts[1].contains('.') {
        return Err(CliError::InvalidArguments(format!(
            "Invalid email '{}': Domain must contain dot",
            email
        ))
        .into());
    }

    Ok(())
}

/// Minimum password length accepted by the server
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn validate_password(password: &str) -> crate::Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CliError::InvalidArguments(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))
        .into());
    }
    Ok(())
}

/// Validate a page size against the allowed range
pub fn validate_page_size(page_size: usize) -> crate::Result<()> {
    if !(1..=1000).contains(&page_size) {
        return Err(CliError::InvalidArguments(format!(
            "Page size {} is out of range (1-1000)",
            page_size
        ))
        .into());
    }
    Ok(())
}

/// Validate a task title: required and not blank
pub fn validate_title(title: &str) -> crate::Result<()> {
    if title.trim().is_empty() {
        return Err(CliError::InvalidArguments("Title cannot be empty".to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_valid_urls() {
        assert!(validate_url("http://localhost:5000").is_ok());
        assert!(validate_url("https://tasks.example.com").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_invalid_urls() {
        assert!(validate_url("").is_err());
        assert!(validate_url("localhost:5000").is_err());
        assert!(validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("12345").is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size(25).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(5000).is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Fix bug").is_ok());
        assert!(validate_title("   ").is_err());
    }
}
