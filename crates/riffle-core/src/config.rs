//! Configuration management for Riffle.
//!
//! This module provides configuration loading, saving, and defaults.
//! Configuration is stored in TOML format in a platform-appropriate location.

use crate::csv::DEFAULT_DELIMITER;
use crate::error::{Result, RiffleError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Main configuration structure for Riffle.
///
/// ## Example Configuration File (riffle.toml)
///
/// ```toml
/// [general]
/// delimiter = ","
/// max_results = 1000
///
/// [search]
/// debounce_ms = 500
/// parallel = true
///
/// [ui]
/// page_size = 50
/// show_row_numbers = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Search and debounce tuning
    pub search: SearchConfig,

    /// UI settings
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            general: GeneralConfig::default(),
            search: SearchConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Field delimiter, a single character
    pub delimiter: String,

    /// Maximum number of search results to display
    pub max_results: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            delimiter: DEFAULT_DELIMITER.to_string(),
            max_results: 10000,
            log_level: "info".to_string(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiescence window for search-as-you-type, in milliseconds
    pub debounce_ms: u64,

    /// Use parallel matching for large record sets
    pub parallel: bool,

    /// Record count above which matching goes parallel
    pub parallel_threshold: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            debounce_ms: 500,
            parallel: true,
            parallel_threshold: 10000,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Number of records to display per page
    pub page_size: usize,

    /// Show record ids alongside rows
    pub show_row_numbers: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            page_size: 100,
            show_row_numbers: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| RiffleError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
        })?;

        // Surface a bad delimiter at load time, not first use
        config.delimiter()?;

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "Saving configuration");
        let contents = toml::to_string_pretty(self).map_err(|e| RiffleError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "riffle").ok_or_else(|| RiffleError::ConfigError {
            reason: "Could not determine config directory".to_string(),
        })?;

        Ok(dirs.config_dir().join("riffle.toml"))
    }

    /// The configured field delimiter as a char.
    ///
    /// Fails with `ConfigError` unless the configured value is exactly one
    /// character.
    pub fn delimiter(&self) -> Result<char> {
        let mut chars = self.general.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(RiffleError::config(format!(
                "delimiter must be a single character, got {:?}",
                self.general.delimiter
            ))),
        }
    }

    /// The configured debounce window.
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// Parallelism threshold for matching, honoring the on/off switch.
    pub fn parallel_threshold(&self) -> usize {
        if self.search.parallel {
            self.search.parallel_threshold
        } else {
            usize::MAX
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.delimiter().unwrap(), ',');
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.general.max_results, 10000);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.general.delimiter = ";".to_string();
        config.search.debounce_ms = 250;

        config.save_to(&config_path).unwrap();
        let loaded = Config::load_from(&config_path).unwrap();

        assert_eq!(loaded.delimiter().unwrap(), ';');
        assert_eq!(loaded.debounce_window(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.general.max_results, 10000); // Default value
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        let mut config = Config::default();
        config.general.delimiter = ",,".to_string();
        assert!(config.delimiter().is_err());

        config.general.delimiter = String::new();
        assert!(config.delimiter().is_err());
    }

    #[test]
    fn test_bad_delimiter_rejected_at_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[general]\ndelimiter = \"ab\"\n").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }

    #[test]
    fn test_parallel_threshold_switch() {
        let mut config = Config::default();
        assert_eq!(config.parallel_threshold(), 10000);

        config.search.parallel = false;
        assert_eq!(config.parallel_threshold(), usize::MAX);
    }
}
