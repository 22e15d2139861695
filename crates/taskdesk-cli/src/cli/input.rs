//! Interactive prompts for credentials and confirmations.

use rpassword::read_password;
use std::io::{self, BufRead, Write};
use taskdesk_core::error::{AppError, CliError};

fn input_error(what: &str, error: io::Error) -> AppError {
    AppError::Cli(CliError::InvalidArguments(format!(
        "Failed to read {}: {}",
        what, error
    )))
}

/// Whether prompts can be answered by a person.
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

fn print_prompt(label: &str) -> Result<(), AppError> {
    print!("{}", label);
    io::stdout()
        .flush()
        .map_err(|e| input_error("terminal", e))
}

pub fn prompt_line(label: &str) -> Result<String, AppError> {
    print_prompt(label)?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| input_error(label.trim_end_matches([':', ' ']), e))?;
    Ok(line.trim().to_string())
}

pub fn prompt_password(label: &str) -> Result<String, AppError> {
    print_prompt(label)?;
    read_password().map_err(|e| input_error("password", e))
}

/// Prompt twice and require both entries to match.
pub fn prompt_new_password() -> Result<String, AppError> {
    let first = prompt_password("New password: ")?;
    let second = prompt_password("Repeat new password: ")?;
    if first != second {
        return Err(CliError::InvalidArguments("Passwords do not match".to_string()).into());
    }
    Ok(first)
}

/// Ask a yes/no question; anything but `y`/`yes` is no.
///
/// Without a terminal on stdin the caller must pass `--yes` instead.
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool, AppError> {
    if assume_yes {
        return Ok(true);
    }
    if !is_interactive() {
        return Err(CliError::InvalidArguments(
            "Refusing to prompt without a terminal; pass --yes to confirm".to_string(),
        )
        .into());
    }
    let answer = prompt_line(&format!("{} [y/N]: ", question))?;
    Ok(is_yes(&answer))
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_confirm_assume_yes() {
        assert!(confirm("Delete?", true).expect("confirmed"));
    }
}
