use crate::core::{DEFAULT_DISPLAY_SIZE, MAX_HISTORY_LENGTH, MERGE_WINDOW_MS};
use crate::utils::telemetry;
use crate::validation::error::{RadarError, RadarResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Radar-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Maximum number of retained history entries
    pub max_history_length: usize,
    /// Samples arriving closer together than this may merge (milliseconds)
    pub merge_window_ms: f64,
    /// Edge length of the square radar display
    pub display_size: f64,
    /// Directory holding persisted records, `None` keeps them in memory
    pub storage_dir: Option<PathBuf>,
    /// Record key for bookmarks
    pub bookmarks_key: String,
    /// Record key for the location history
    pub history_key: String,
    /// Default `tracing` filter directive
    pub log_filter: String,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            max_history_length: MAX_HISTORY_LENGTH,
            merge_window_ms: MERGE_WINDOW_MS,
            display_size: DEFAULT_DISPLAY_SIZE,
            storage_dir: None,
            bookmarks_key: "bookmarks".to_string(),
            history_key: "history".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl RadarConfig {
    /// Install the global log subscriber with `log_filter` as the default.
    ///
    /// `RUST_LOG` still takes precedence. Returns `false` if a subscriber was
    /// already installed.
    pub fn init_logging(&self) -> bool {
        telemetry::init_tracing(&self.log_filter)
    }
}

/// Configuration validation result
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<RadarError>,
    pub warnings: Vec<String>,
}

/// Loads, validates and stores the radar configuration
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: RadarConfig,
    config_file_path: Option<PathBuf>,
    is_modified: bool,
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RadarResult<Self> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Replace the whole configuration after validation
    pub fn update_config(&mut self, config: RadarConfig) -> RadarResult<()> {
        Self::ensure_valid(&config)?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> RadarResult<()> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            RadarError::storage(&path_str, format!("failed to read config file: {}", e))
        })?;

        let config: RadarConfig = serde_json::from_str(&content)
            .map_err(|e| RadarError::serialization(&path_str, e.to_string()))?;

        Self::ensure_valid(&config)?;

        tracing::info!(path = %path_str, "configuration loaded");
        self.config = config;
        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> RadarResult<()> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = serde_json::to_string_pretty(&self.config)
            .map_err(|e| RadarError::serialization(&path_str, e.to_string()))?;

        fs::write(path, content).map_err(|e| {
            RadarError::storage(&path_str, format!("failed to write config file: {}", e))
        })?;

        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was last loaded from or saved to
    pub fn save(&mut self) -> RadarResult<()> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(RadarError::config(
                "config_file_path",
                "none",
                "no configuration file has been loaded or saved yet",
            )),
        }
    }

    pub fn set_max_history_length(&mut self, length: usize) -> RadarResult<usize> {
        let mut config = self.config.clone();
        let old = config.max_history_length;
        config.max_history_length = length;
        self.update_config(config)?;
        Ok(old)
    }

    pub fn set_merge_window(&mut self, window_ms: f64) -> RadarResult<f64> {
        let mut config = self.config.clone();
        let old = config.merge_window_ms;
        config.merge_window_ms = window_ms;
        self.update_config(config)?;
        Ok(old)
    }

    pub fn set_display_size(&mut self, size: f64) -> RadarResult<f64> {
        let mut config = self.config.clone();
        let old = config.display_size;
        config.display_size = size;
        self.update_config(config)?;
        Ok(old)
    }

    pub fn set_storage_dir(&mut self, dir: Option<PathBuf>) -> Option<PathBuf> {
        self.is_modified = true;
        std::mem::replace(&mut self.config.storage_dir, dir)
    }

    fn ensure_valid(config: &RadarConfig) -> RadarResult<()> {
        let validation = Self::validate_config(config);
        for warning in &validation.warnings {
            tracing::warn!("{}", warning);
        }
        match validation.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Check every parameter, collecting all errors and warnings
    pub fn validate_config(config: &RadarConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if config.max_history_length == 0 {
            errors.push(RadarError::config(
                "max_history_length",
                config.max_history_length,
                "history must keep at least one entry",
            ));
        } else if config.max_history_length > 10_000 {
            warnings.push("Very long history is rewritten in full on every fix".to_string());
        }

        if !config.merge_window_ms.is_finite() || config.merge_window_ms < 0.0 {
            errors.push(RadarError::config(
                "merge_window_ms",
                config.merge_window_ms,
                "merge window must be a non-negative number of milliseconds",
            ));
        } else if config.merge_window_ms == 0.0 {
            warnings.push("Zero merge window disables history merging".to_string());
        }

        if !config.display_size.is_finite() || config.display_size <= 0.0 {
            errors.push(RadarError::config(
                "display_size",
                config.display_size,
                "display size must be positive",
            ));
        }

        for (parameter, key) in [
            ("bookmarks_key", &config.bookmarks_key),
            ("history_key", &config.history_key),
        ] {
            if !is_valid_key(key) {
                errors.push(RadarError::config(
                    parameter,
                    key,
                    "record keys may only use [A-Za-z0-9._-]",
                ));
            }
        }

        if config.bookmarks_key == config.history_key {
            errors.push(RadarError::config(
                "history_key",
                &config.history_key,
                "bookmarks and history must use different records",
            ));
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = RadarConfig::default();
        assert_eq!(config.max_history_length, 100);
        assert_eq!(config.merge_window_ms, 30_000.0);
        assert!(config.storage_dir.is_none());
        assert!(ConfigurationManager::validate_config(&config).is_valid);
    }

    #[test]
    fn test_configuration_manager_creation() {
        let manager = ConfigurationManager::new();
        assert_eq!(manager.config(), &RadarConfig::default());
        assert!(!manager.is_modified());
    }

    #[test]
    fn test_invalid_config_collects_errors() {
        let config = RadarConfig {
            max_history_length: 0,
            merge_window_ms: -1.0,
            display_size: 0.0,
            bookmarks_key: "../x".to_string(),
            history_key: "../x".to_string(),
            ..RadarConfig::default()
        };

        let result = ConfigurationManager::validate_config(&config);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 6);
    }

    #[test]
    fn test_setters_validate() {
        let mut manager = ConfigurationManager::new();

        assert_eq!(manager.set_max_history_length(50).unwrap(), 100);
        assert_eq!(manager.config().max_history_length, 50);
        assert!(manager.is_modified());

        let err = manager.set_merge_window(f64::NAN).unwrap_err();
        assert!(matches!(err, RadarError::Config { ref parameter, .. } if parameter == "merge_window_ms"));
        assert_eq!(manager.config().merge_window_ms, 30_000.0);

        assert!(manager.set_display_size(-5.0).is_err());
        assert_eq!(manager.set_display_size(300.0).unwrap(), 400.0);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radar.json");

        let mut manager = ConfigurationManager::new();
        manager.set_merge_window(10_000.0).unwrap();
        manager.set_storage_dir(Some(dir.path().join("records")));
        manager.save_to_file(&path).unwrap();
        assert!(!manager.is_modified());

        let loaded = ConfigurationManager::from_file(&path).unwrap();
        assert_eq!(loaded.config(), manager.config());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radar.json");
        fs::write(&path, r#"{ "display_size": 250.0 }"#).unwrap();

        let manager = ConfigurationManager::from_file(&path).unwrap();
        assert_eq!(manager.config().display_size, 250.0);
        assert_eq!(manager.config().history_key, "history");
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radar.json");

        fs::write(&path, r#"{ "max_history_length": 0 }"#).unwrap();
        assert!(matches!(
            ConfigurationManager::from_file(&path),
            Err(RadarError::Config { .. })
        ));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ConfigurationManager::from_file(&path),
            Err(RadarError::Serialization { .. })
        ));
    }

    #[test]
    fn test_init_logging_installs_once() {
        let config = RadarConfig {
            log_filter: "compass_radar=debug".to_string(),
            ..RadarConfig::default()
        };
        config.init_logging();
        assert!(!config.init_logging());
        assert!(!telemetry::init_tracing("info"));
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut manager = ConfigurationManager::new();
        assert!(manager.save().is_err());
    }
}
