//! Process configuration from environment variables.
//!
//! Business settings (thresholds, password) are not here; they live in the
//! database `settings` table.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "SHEPHERD_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "SHEPHERD_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "SHEPHERD_LOG_DIR";

const DEFAULT_DB_FILE: &str = "shepherd.sqlite3";
const DEFAULT_LOG_DIR: &str = "shepherd-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but blank.
    Blank(&'static str),
    /// Log directory must be absolute.
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(var) => write!(f, "{var} is set but empty"),
            Self::RelativeLogDir(path) => {
                write!(f, "{LOG_DIR_VAR} must be absolute, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl CoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Unset variables fall back
    /// to a temp-dir database and the build-mode log level.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(value) if value.trim().is_empty() => Err(ConfigError::Blank(name)),
                Some(value) => Ok(Some(value.trim().to_string())),
            }
        };

        let db_path = read(DB_PATH_VAR)?
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE));
        let log_level = read(LOG_LEVEL_VAR)?.unwrap_or_else(|| default_log_level().to_string());
        let log_dir = read(LOG_DIR_VAR)?
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR));
        if !log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(log_dir));
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}
