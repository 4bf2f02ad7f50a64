//! Configuration management for vidqueue

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Bound of the action queue; producers wait once it is full
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Process already-accepted actions after shutdown is signaled
    #[serde(default = "default_drain_on_shutdown")]
    pub drain_on_shutdown: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a notification stays visible before it is dismissed
    #[serde(default = "default_notification_ttl_ms")]
    pub ttl_ms: u64,
}

fn default_queue_capacity() -> usize {
    256
}

fn default_drain_on_shutdown() -> bool {
    true
}

fn default_notification_ttl_ms() -> u64 {
    4000
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            drain_on_shutdown: default_drain_on_shutdown(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_notification_ttl_ms(),
        }
    }
}

impl NotificationConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default_config()
        };

        if let Ok(db_path) = std::env::var("VIDQUEUE_DB_PATH") {
            config.database.path = db_path;
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        if config.dispatcher.queue_capacity == 0 {
            return Err(ConfigError::MissingField(
                "dispatcher.queue_capacity must be at least 1".to_string(),
            )
            .into());
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig {
                path: "~/.local/share/vidqueue/library.db".to_string(),
            },
            dispatcher: DispatcherConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

/// Resolve the configuration file path under the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("VIDQUEUE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("vidqueue").join("config.toml"))
}

/// Resolve the database path, expanding `~`
pub fn resolve_db_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [database]
            path = "/tmp/vq.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, "/tmp/vq.db");
        assert_eq!(config.dispatcher.queue_capacity, 256);
        assert!(config.dispatcher.drain_on_shutdown);
        assert_eq!(config.notifications.ttl(), Duration::from_secs(4));
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [database]
            path = "~/videos.db"

            [dispatcher]
            queue_capacity = 8
            drain_on_shutdown = false

            [notifications]
            ttl_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatcher.queue_capacity, 8);
        assert!(!config.dispatcher.drain_on_shutdown);
        assert_eq!(config.notifications.ttl_ms, 250);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = Config::from_toml(
            r#"
            [database]
            path = "/tmp/vq.db"

            [dispatcher]
            queue_capacity = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_database_section_is_parse_error() {
        let err = Config::from_toml("[dispatcher]\nqueue_capacity = 4\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default_config();
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"/data/library.db\"").unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.database.path, "/data/library.db");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\npath = \"/from/file.db\"\n").unwrap();

        std::env::set_var("VIDQUEUE_CONFIG", &path);
        std::env::set_var("VIDQUEUE_DB_PATH", "/from/env.db");
        let config = Config::load();
        std::env::remove_var("VIDQUEUE_CONFIG");
        std::env::remove_var("VIDQUEUE_DB_PATH");

        assert_eq!(config.unwrap().database.path, "/from/env.db");
    }

    #[test]
    #[serial]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        std::env::set_var("VIDQUEUE_CONFIG", dir.path().join("absent.toml"));
        let config = Config::load();
        std::env::remove_var("VIDQUEUE_CONFIG");

        assert_eq!(config.unwrap(), Config::default_config());
    }

    #[test]
    fn test_resolve_db_path_expands_tilde() {
        let resolved = resolve_db_path("~/library.db");
        assert!(!resolved.to_string_lossy().starts_with('~'));
    }
}
