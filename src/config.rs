//! Configuration for Habit DNA.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration for the engine and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path for the fingerprint store and audit counters
    pub data_path: PathBuf,

    /// Length of the rolling log window analyzed on each regeneration
    #[serde(with = "duration_days")]
    pub lookback: Duration,

    /// IANA timezone used for streak day boundaries
    pub timezone: String,

    /// Worker threads for batch regeneration
    pub workers: usize,

    /// How many times a conflicting store write is retried
    pub max_cas_retries: u32,

    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("habit-dna");

        Self {
            data_path: data_dir,
            lookback: Duration::from_secs(90 * SECS_PER_DAY),
            timezone: "UTC".to_string(),
            workers: 4,
            max_cas_retries: 3,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("habit-dna")
            .join("config.json")
    }

    /// Directory holding one JSON record per user.
    pub fn store_path(&self) -> PathBuf {
        self.data_path.join("fingerprints")
    }

    /// File holding persisted audit counters.
    pub fn audit_path(&self) -> PathBuf {
        self.data_path.join("audit.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(self.store_path())?;
        Ok(())
    }

    /// Parsed streak timezone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }

    /// Lookback window as a chrono duration.
    pub fn lookback_window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.lookback).unwrap_or_else(|_| chrono::Duration::days(90))
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tz()?;
        if self.workers == 0 {
            return Err(ConfigError::ParseError("workers must be at least 1".to_string()));
        }
        if chrono::Duration::from_std(self.lookback).is_err() {
            return Err(ConfigError::ParseError(format!(
                "lookback of {} days is out of range",
                self.lookback.as_secs() / SECS_PER_DAY
            )));
        }
        Ok(())
    }
}

const SECS_PER_DAY: u64 = 86_400;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),
}

/// Serde support for Duration as whole days.
mod duration_days {
    use super::SECS_PER_DAY;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_secs() / SECS_PER_DAY).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let days = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(days.saturating_mul(SECS_PER_DAY)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lookback, Duration::from_secs(90 * 86_400));
        assert_eq!(config.lookback_window(), chrono::Duration::days(90));
        assert_eq!(config.tz().unwrap(), Tz::UTC);
        assert_eq!(config.max_cas_retries, 3);
        assert!(config.store_path().ends_with("fingerprints"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"lookback": 30, "timezone": "Europe/Berlin"}"#).unwrap();
        assert_eq!(config.lookback_window(), chrono::Duration::days(30));
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let config = Config {
            timezone: "Mars/Olympus".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimezone(_))));
    }

    #[test]
    fn test_lookback_range() {
        let config: Config = serde_json::from_str(r#"{"lookback": 1000000000}"#).unwrap();
        assert!(config.validate().is_ok());

        let config: Config =
            serde_json::from_str(r#"{"lookback": 18446744073709551615}"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            workers: 8,
            log_level: "debug".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.workers, 8);
        assert_eq!(loaded.log_level, "debug");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.timezone, "UTC");
    }
}
