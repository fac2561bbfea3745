//! CLI configuration handling.
//!
//! ```toml
//! [database]
//! path = "rolodex.db"
//! busy_timeout = 5000
//! cache_size = -2000
//! synchronous = "normal"
//! journal_mode = "wal"
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use rolodex_query::LogFormat;
use rolodex_sqlite::{DatabasePath, SqliteConfig, SqliteError};

use crate::error::{CliError, CliResult};

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "rolodex.toml";

/// Default database file name (relative to the config file)
pub const DATABASE_FILE_NAME: &str = "rolodex.db";

/// Rolodex CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> CliResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build the store configuration.
    ///
    /// `database` overrides the configured path and is used as given. A
    /// relative configured path is resolved against `base`, the directory
    /// of the config file.
    pub fn sqlite_config(&self, database: Option<&str>, base: &Path) -> CliResult<SqliteConfig> {
        let invalid = |e: SqliteError| CliError::Config(e.to_string());
        let mut config = SqliteConfig::from_url(database.unwrap_or(self.database.path.as_str()))
            .map_err(invalid)?;

        if database.is_none() {
            let path = match config.path.clone() {
                DatabasePath::File(path) if path.is_relative() => DatabasePath::File(base.join(path)),
                other => other,
            };
            config = config.path(path);
        }

        let db = &self.database;
        if let Some(ms) = db.busy_timeout {
            config = config.busy_timeout(ms);
        }
        if let Some(size) = db.cache_size {
            config = config.cache_size(size);
        }
        if let Some(mode) = &db.synchronous {
            config = config.synchronous(mode.parse().map_err(invalid)?);
        }
        if let Some(mode) = &db.journal_mode {
            config = config.journal_mode(mode.parse().map_err(invalid)?);
        }

        Ok(config)
    }

    /// The configured log format, JSON when unset.
    pub fn log_format(&self) -> CliResult<LogFormat> {
        match &self.logging.format {
            Some(format) => format.parse().map_err(CliError::Config),
            None => Ok(LogFormat::default()),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path or `sqlite:` URL
    pub path: String,

    /// Busy timeout in milliseconds
    pub busy_timeout: Option<u32>,

    /// Page cache size, in pages or negative KiB
    pub cache_size: Option<i32>,

    /// Synchronous mode (off, normal, full, extra)
    pub synchronous: Option<String>,

    /// Journal mode (delete, truncate, persist, memory, wal, off)
    pub journal_mode: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DATABASE_FILE_NAME.to_string(),
            busy_timeout: None,
            cache_size: None,
            synchronous: None,
            journal_mode: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (json, pretty, compact)
    pub format: Option<String>,
}

/// The directory relative database paths in `config_path` resolve against.
pub fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rolodex_sqlite::{JournalMode, SynchronousMode};

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "contacts.db"
            busy_timeout = 250
            cache_size = 500
            synchronous = "full"
            journal_mode = "delete"

            [logging]
            level = "debug"
            format = "pretty"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, "contacts.db");
        assert_eq!(config.database.busy_timeout, Some(250));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.log_format().unwrap(), LogFormat::Pretty);

        let sqlite = config.sqlite_config(None, Path::new("/srv")).unwrap();
        assert_eq!(sqlite.path, DatabasePath::File("/srv/contacts.db".into()));
        assert_eq!(sqlite.busy_timeout_ms, Some(250));
        assert_eq!(sqlite.journal_mode, JournalMode::Delete);
        assert_eq!(sqlite.synchronous, SynchronousMode::Full);
        assert_eq!(sqlite.cache_size, Some(500));
        assert!(sqlite.pragmas().contains(&("cache_size", "500".to_string())));
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database.path, DATABASE_FILE_NAME);
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_override_database() {
        let config = Config::default();
        let sqlite = config
            .sqlite_config(Some("sqlite::memory:"), Path::new("/srv"))
            .unwrap();
        assert!(sqlite.path.is_memory());

        let sqlite = config.sqlite_config(Some("here.db"), Path::new("/srv")).unwrap();
        assert_eq!(sqlite.path, DatabasePath::File("here.db".into()));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.database.journal_mode = Some("sideways".into());
        assert!(matches!(
            config.sqlite_config(None, Path::new(".")),
            Err(CliError::Config(_))
        ));

        config.database.journal_mode = None;
        config.database.synchronous = Some("sometimes".into());
        assert!(matches!(
            config.sqlite_config(None, Path::new(".")),
            Err(CliError::Config(_))
        ));

        config.logging.format = Some("xml".into());
        assert!(config.log_format().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.logging.level = Some("info".into());
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
        assert_eq!(
            Config::load_or_default(&dir.path().join("missing.toml")).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_base_dir() {
        assert_eq!(base_dir(Path::new("rolodex.toml")), PathBuf::from("."));
        assert_eq!(base_dir(Path::new("/etc/rolodex.toml")), PathBuf::from("/etc"));
    }
}
