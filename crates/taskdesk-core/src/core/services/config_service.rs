//! Configuration service for managing application configuration

use crate::AppError;
use crate::storage::config::Config;
use crate::utils::validation::{validate_page_size, validate_url};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration service for managing application configuration
pub struct ConfigService {
    config: Config,
}

impl ConfigService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get configured URL, falling back to `TASKDESK_URL`
    pub fn get_url(&self) -> Option<String> {
        self.config.get_url()
    }

    pub fn set_url(&mut self, url: String) -> Result<(), AppError> {
        validate_url(&url)?;
        self.config.set_url(url.trim_end_matches('/').to_string());
        Ok(())
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size()
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), AppError> {
        validate_page_size(page_size)?;
        self.config.page_size = Some(page_size);
        Ok(())
    }

    pub fn cache_expiry(&self) -> Duration {
        self.config.cache_expiry()
    }

    pub fn set_cache_expiry_secs(&mut self, secs: u64) {
        self.config.cache_expiry_secs = Some(secs);
    }

    /// Save configuration to file
    pub fn save_config(&self, path: Option<PathBuf>) -> Result<(), AppError> {
        self.config.save(path).map_err(|e| e.into())
    }

    pub fn has_url(&self) -> bool {
        self.get_url().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_url_validates_and_trims() {
        let mut service = ConfigService::new(Config::default());

        assert!(service.set_url("localhost:5000".to_string()).is_err());

        service
            .set_url("http://localhost:5000/".to_string())
            .expect("valid url");
        assert!(service.has_url());
        assert_eq!(service.get_url(), Some("http://localhost:5000".to_string()));
    }

    #[test]
    fn test_page_size_bounds() {
        let mut service = ConfigService::new(Config::default());
        assert!(service.set_page_size(0).is_err());
        assert!(service.set_page_size(5000).is_err());
        service.set_page_size(50).expect("valid size");
        assert_eq!(service.page_size(), 50);
    }

    #[test]
    fn test_save_config_roundtrip() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.toml");

        let mut service = ConfigService::new(Config::default());
        service.set_cache_expiry_secs(30);
        service.save_config(Some(path.clone())).expect("save");

        let loaded = Config::load(Some(path)).expect("load");
        assert_eq!(loaded.cache_expiry(), Duration::from_secs(30));
    }
}
