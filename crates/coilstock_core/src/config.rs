//! Explicit configuration for the coil store.
//!
//! # Responsibility
//! - Describe where the database lives and how logging is set up.
//! - Parse TOML config files and apply `COILSTOCK_*` environment overrides.
//!
//! # Invariants
//! - There is no process-wide settings instance; callers build a
//!   `CoreConfig` and pass it to `CoilStore::open`.
//! - Missing sections and fields fall back to defaults.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_PATH: &str = "COILSTOCK_DATABASE_PATH";
pub const ENV_LOG_LEVEL: &str = "COILSTOCK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "COILSTOCK_LOG_DIR";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration passed to `CoilStore::open`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Storage location and connection tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// File logging setup. Logging stays off while `dir` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl CoreConfig {
    /// Parses a TOML document and validates the result.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Applies `COILSTOCK_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides resolved through `lookup`.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a configured path.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = non_empty(ENV_DATABASE_PATH) {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = non_empty(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(dir));
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.logging.level).map_err(|message| ConfigError::InvalidValue {
            key: "logging.level",
            message,
        })?;
        if self.database.busy_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "database.busy_timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
