//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the client configuration
//! from the configuration file (~/.config/facturas/config.toml).

use crate::paths::FacturasPaths;
use facturas_core::{ClientConfig, FacturasError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "FACTURAS_API_URL";

/// Configuration service that loads and caches the client configuration.
///
/// A missing file is not an error: defaults are used. Environment
/// overrides are applied on every load.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit file location; `None` means the platform default.
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading the platform default location.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let path = self.config_path()?;
        let loaded = Self::load_from(&path)?;
        let loaded = apply_overrides(loaded, std::env::var(API_URL_ENV).ok());

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => FacturasPaths::config_file().map_err(|e| FacturasError::config(e.to_string())),
        }
    }

    /// Parses `path`, or returns defaults when the file does not exist.
    fn load_from(path: &Path) -> Result<ClientConfig> {
        if !path.exists() {
            tracing::debug!(
                "[ConfigService] No config at {}, using defaults",
                path.display()
            );
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        tracing::debug!(
            "[ConfigService] Loaded config from {} (api: {})",
            path.display(),
            config.base_url()
        );
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies environment-provided values on top of the file configuration.
pub fn apply_overrides(mut config: ClientConfig, api_url: Option<String>) -> ClientConfig {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigService::load_from(&temp_dir.path().join("config.toml"))
            .expect("missing file is not an error");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_file_values_are_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"http://127.0.0.1:5000\"\nrequest_timeout_secs = 30\n",
        )
        .unwrap();

        let config = ConfigService::load_from(&path).unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "api_base_url = [").unwrap();

        let err = ConfigService::load_from(&path).unwrap_err();
        assert!(matches!(err, FacturasError::Config(_)));
    }

    #[test]
    fn test_cache_survives_file_change_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "request_timeout_secs = 10\n").unwrap();
        let service = ConfigService::with_path(&path);

        assert_eq!(service.get_config().unwrap().request_timeout_secs, 10);
        fs::write(&path, "request_timeout_secs = 20\n").unwrap();
        assert_eq!(service.get_config().unwrap().request_timeout_secs, 10);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().request_timeout_secs, 20);
    }

    #[test]
    fn test_env_override_replaces_url() {
        let config = apply_overrides(ClientConfig::default(), Some(" http://localhost:8080 ".into()));
        assert_eq!(config.api_base_url, "http://localhost:8080");

        let untouched = apply_overrides(ClientConfig::default(), Some("  ".into()));
        assert_eq!(untouched, ClientConfig::default());
    }
}
