//! Configuration for atoll-server.
//!
//! One TOML bootstrap file (`atoll.toml` by default) holds everything that
//! cannot change while the server runs: database path, port, upload root,
//! log level. A missing file is not an error; every field has a built-in
//! default, so a bare binary starts with a local `atoll.db` and `uploads/`.
//!
//! Priority: command-line arguments, then the TOML file, then built-in
//! defaults.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use atoll_common::{Error, Result};

/// Bootstrap configuration parsed from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory all uploaded artifacts live under. Stored file records
    /// embed paths rooted here, so changing it orphans existing records.
    #[serde(default = "default_upload_root")]
    pub upload_root: PathBuf,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            port: default_port(),
            upload_root: default_upload_root(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("atoll.db")
}

fn default_port() -> u16 {
    9090
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database file path
    pub database_path: PathBuf,

    /// HTTP server port
    pub port: u16,

    /// Root directory for uploaded artifacts
    pub upload_root: PathBuf,

    /// Log level used when RUST_LOG is not set
    pub log_level: String,
}

impl Config {
    /// Load configuration from the TOML file and apply CLI overrides.
    ///
    /// A missing file falls back to built-in defaults; an unreadable or
    /// malformed file is an error.
    pub async fn load(toml_path: &Path, overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match tokio::fs::read_to_string(toml_path).await {
            Ok(raw) => {
                let parsed: TomlConfig = toml::from_str(&raw).map_err(|e| {
                    Error::Config(format!("Failed to parse {}: {}", toml_path.display(), e))
                })?;
                info!("Loaded configuration from {}", toml_path.display());
                parsed
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "No configuration file at {}, using built-in defaults",
                    toml_path.display()
                );
                TomlConfig::default()
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "Failed to read {}: {}",
                    toml_path.display(),
                    e
                )))
            }
        };

        Ok(Config {
            database_path: overrides
                .database_path
                .unwrap_or(toml_config.database_path),
            port: overrides.port.unwrap_or(toml_config.port),
            upload_root: overrides.upload_root.unwrap_or(toml_config.upload_root),
            log_level: toml_config.logging.level,
        })
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub upload_root: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.database_path, PathBuf::from("atoll.db"));
        assert_eq!(config.port, 9090);
        assert_eq!(config.upload_root, PathBuf::from("uploads"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 8000

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.database_path, PathBuf::from("atoll.db"));
        assert_eq!(config.logging.level, "debug");
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let config = Config::load(Path::new("does/not/exist.toml"), ConfigOverrides::default())
            .await
            .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.log_level, "info");
    }

    #[tokio::test]
    async fn test_load_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8000\ndatabase_path = \"x.db\"").unwrap();

        let overrides = ConfigOverrides {
            port: Some(7000),
            ..Default::default()
        };
        let config = Config::load(file.path(), overrides).await.unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.database_path, PathBuf::from("x.db"));
        assert_eq!(config.upload_root, PathBuf::from("uploads"));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        let err = Config::load(file.path(), ConfigOverrides::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
