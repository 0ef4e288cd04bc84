//! Configuration management for RationDB
//!
//! This module provides:
//! - Store configuration loaded from TOML
//! - Configuration validation and defaults

use crate::document::DEFAULT_ID_FIELD;
use crate::monitoring::LoggingConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name of the identity field assigned on insert
    pub id_field: String,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: StoreConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Write configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_field.is_empty() {
            return Err(ConfigError::InvalidIdField(
                "identity field name cannot be empty".to_string(),
            ));
        }
        if self.id_field.starts_with('$') {
            return Err(ConfigError::InvalidIdField(format!(
                "'{}' cannot start with '$'",
                self.id_field
            )));
        }
        if self.id_field.contains('.') {
            return Err(ConfigError::InvalidIdField(format!(
                "'{}' cannot contain '.'",
                self.id_field
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid identity field: {0}")]
    InvalidIdField(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.id_field, "id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rationdb.toml");

        let mut config = StoreConfig::default();
        config.id_field = "_id".to_string();
        config.logging.json_format = true;
        config.logging.slow_query_threshold_ms = 25;
        config.save(&path).unwrap();

        let loaded = StoreConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rationdb.toml");
        std::fs::write(&path, "[logging]\nlevel = \"DEBUG\"\n").unwrap();

        let loaded = StoreConfig::load(&path).unwrap();
        assert_eq!(loaded.id_field, "id");
        assert_eq!(loaded.logging.level, "DEBUG");
        assert!(loaded.logging.slow_query_logging);
    }

    #[test]
    fn test_invalid_id_field_rejected() {
        for bad in ["", "$id", "meta.id"] {
            let config = StoreConfig {
                id_field: bad.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{:?} should be rejected", bad);
        }

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "id_field = \"$oid\"\n").unwrap();
        assert!(StoreConfig::load(&path).is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "id_field = [").unwrap();
        assert!(StoreConfig::load(&path).is_err());
    }
}
