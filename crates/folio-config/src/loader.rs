//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use folio_core::FolioError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Environment variable prefix for overrides (`FOLIO__REDIS__URL`, ...).
pub const ENV_PREFIX: &str = "FOLIO";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `FOLIO` prefix and `__` separator
    pub fn new(config_dir: impl Into<String>) -> Result<Self, FolioError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, FolioError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk. The current configuration is kept
    /// when the new one fails to load or validate.
    pub async fn reload(&self) -> Result<(), FolioError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, FolioError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("FOLIO_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_folio_error)?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_folio_error)?;

        ConfigValidator::validate(&app_config)
            .map_err(|errors| FolioError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }

    /// Gets a specific configuration value by dotted key path.
    pub async fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let config = self.config.read().await;
        let json = serde_json::to_value(&*config).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

fn config_error_to_folio_error(err: ConfigError) -> FolioError {
    FolioError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.redis.operation_timeout_ms, 5000);
        assert_eq!(config.redis.scan_batch_size, 100);
        assert_eq!(config.redis.ttl.default_secs, 300);
    }

    #[tokio::test]
    async fn test_loads_files_in_layers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[redis]\nscan_batch_size = 50\n[server]\nport = 9000\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "[server]\nport = 9100\n").unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy().to_string()).unwrap();
        let config = loader.get().await;

        assert_eq!(config.redis.scan_batch_size, 50);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.redis.operation_timeout_ms, 5000);
    }

    #[tokio::test]
    async fn test_get_value_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path().to_string_lossy().to_string()).unwrap();

        let ttl: Option<u64> = loader.get_value("redis.ttl.long_secs").await;
        assert_eq!(ttl, Some(86400));
        let missing: Option<String> = loader.get_value("redis.nope").await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[redis]\nscan_batch_size = 0\n").unwrap();

        let err = ConfigLoader::new(dir.path().to_string_lossy().to_string())
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("scan_batch_size"));
    }
}
