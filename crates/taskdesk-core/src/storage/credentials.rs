//! Bearer token storage
//!
//! `TASKDESK_TOKEN` takes precedence; otherwise the token saved by
//! `auth login` is read from the OS keyring.

use super::Result;
use std::env;

#[cfg(not(test))]
use crate::error::StorageError;
#[cfg(not(test))]
use keyring::Entry;

pub const TOKEN_ENV: &str = "TASKDESK_TOKEN";
pub const KEYRING_SERVICE: &str = "taskdesk";
const KEYRING_ACCOUNT: &str = "session-token";

/// Where the active bearer token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    Keyring,
}

impl TokenSource {
    pub fn label(&self) -> &'static str {
        match self {
            TokenSource::Environment => "environment (TASKDESK_TOKEN)",
            TokenSource::Keyring => "system keyring",
        }
    }
}

/// Token from the environment, if set and non-empty.
pub fn env_token() -> Option<String> {
    env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty())
}

/// Resolve the active token and its source.
pub fn load_token() -> Result<Option<(String, TokenSource)>> {
    if let Some(token) = env_token() {
        return Ok(Some((token, TokenSource::Environment)));
    }
    Ok(read_keyring()?.map(|token| (token, TokenSource::Keyring)))
}

pub fn store_token(token: &str) -> Result<()> {
    write_keyring(token)?;
    log::info!("session token saved to keyring");
    Ok(())
}

/// Remove the saved token. A missing entry is not an error.
pub fn clear_token() -> Result<()> {
    delete_keyring()?;
    log::info!("session token removed from keyring");
    Ok(())
}

#[cfg(not(test))]
fn entry() -> Result<Entry> {
    Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
        .map_err(|e| StorageError::KeyringError(e.to_string()))
}

#[cfg(not(test))]
fn read_keyring() -> Result<Option<String>> {
    match entry()?.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(StorageError::KeyringError(e.to_string())),
    }
}

#[cfg(not(test))]
fn write_keyring(token: &str) -> Result<()> {
    entry()?
        .set_password(token)
        .map_err(|e| StorageError::KeyringError(e.to_string()))
}

#[cfg(not(test))]
fn delete_keyring() -> Result<()> {
    match entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(StorageError::KeyringError(e.to_string())),
    }
}

// Tests never touch the real keyring; each test thread gets its own slot.
#[cfg(test)]
thread_local! {
    static MOCK_KEYRING: std::cell::RefCell<Option<String>> = const { std::cell::RefCell::new(None) };
}

#[cfg(test)]
fn read_keyring() -> Result<Option<String>> {
    Ok(MOCK_KEYRING.with(|slot| slot.borrow().clone()))
}

#[cfg(test)]
fn write_keyring(token: &str) -> Result<()> {
    MOCK_KEYRING.with(|slot| *slot.borrow_mut() = Some(token.to_string()));
    Ok(())
}

#[cfg(test)]
fn delete_keyring() -> Result<()> {
    MOCK_KEYRING.with(|slot| *slot.borrow_mut() = None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_resolution_order() {
        let original = env::var(TOKEN_ENV).ok();
        unsafe {
            env::remove_var(TOKEN_ENV);
        }

        assert_eq!(load_token().expect("load"), None);

        store_token("from-keyring").expect("store");
        assert_eq!(
            load_token().expect("load"),
            Some(("from-keyring".to_string(), TokenSource::Keyring))
        );

        unsafe {
            env::set_var(TOKEN_ENV, "from-env");
        }
        assert_eq!(
            load_token().expect("load"),
            Some(("from-env".to_string(), TokenSource::Environment))
        );

        unsafe {
            env::set_var(TOKEN_ENV, "");
        }
        assert_eq!(env_token(), None);

        clear_token().expect("clear");
        assert_eq!(load_token().expect("load"), None);

        unsafe {
            match original {
                Some(value) => env::set_var(TOKEN_ENV, value),
                None => env::remove_var(TOKEN_ENV),
            }
        }
    }

    #[test]
    fn test_clear_without_entry_is_ok() {
        assert!(clear_token().is_ok());
        assert!(clear_token().is_ok());
    }

    #[test]
    fn test_source_labels() {
        assert!(TokenSource::Environment.label().contains(TOKEN_ENV));
        assert_eq!(TokenSource::Keyring.label(), "system keyring");
    }
}
