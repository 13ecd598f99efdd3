//! Store configuration loaded from the environment.
//!
//! # Responsibility
//! - Resolve the database location and connection timeout outside of code.
//! - Resolve optional logging settings for the driver binary.
//!
//! # Environment Variables
//! - `CUSTOMER_DB_PATH` (required): SQLite database file.
//! - `CUSTOMER_DB_BUSY_TIMEOUT_MS` (optional, default 5000): lock-wait timeout.
//! - `CUSTOMER_DB_LOG_LEVEL` (optional): trace|debug|info|warn|error.
//! - `CUSTOMER_DB_LOG_DIR` (optional): absolute directory for rolling logs.
//!
//! # Invariants
//! - No connection setting is compiled into the binary.
//! - Blank values are treated the same as unset values.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "CUSTOMER_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "CUSTOMER_DB_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "CUSTOMER_DB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CUSTOMER_DB_LOG_DIR";

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
/// SQLite takes the busy timeout as a C `int` of milliseconds.
pub const MAX_BUSY_TIMEOUT_MS: u64 = i32::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid {
        variable: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(variable) => write!(f, "missing environment variable `{variable}`"),
            Self::Invalid { variable, message } => {
                write!(f, "invalid environment variable `{variable}`: {message}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for the customer store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file. Created on first open.
    pub database_path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Builds a config for `database_path` with the default timeout.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Loads store settings from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    /// - `ConfigError::Missing` when `CUSTOMER_DB_PATH` is unset.
    /// - `ConfigError::Invalid` when the timeout is not a whole number of
    ///   milliseconds, or exceeds `MAX_BUSY_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_file();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads store settings through an arbitrary key lookup.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let database_path =
            non_blank(lookup(ENV_DB_PATH)).ok_or(ConfigError::Missing(ENV_DB_PATH))?;

        let busy_timeout = match non_blank(lookup(ENV_BUSY_TIMEOUT_MS)) {
            Some(raw) => {
                let millis = raw.parse::<u64>().map_err(|err| ConfigError::Invalid {
                    variable: ENV_BUSY_TIMEOUT_MS,
                    message: format!("`{raw}` is not a millisecond count: {err}"),
                })?;
                if millis > MAX_BUSY_TIMEOUT_MS {
                    return Err(ConfigError::Invalid {
                        variable: ENV_BUSY_TIMEOUT_MS,
                        message: format!("`{raw}` exceeds {MAX_BUSY_TIMEOUT_MS} ms"),
                    });
                }
                Duration::from_millis(millis)
            }
            None => DEFAULT_BUSY_TIMEOUT,
        };

        Ok(Self {
            database_path: PathBuf::from(database_path),
            busy_timeout,
        })
    }
}

/// Optional logging settings for the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Option<String>,
    pub log_dir: Option<String>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        load_env_file();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self {
            level: non_blank(lookup(ENV_LOG_LEVEL)),
            log_dir: non_blank(lookup(ENV_LOG_DIR)),
        }
    }
}

/// Loads `.env` from the working directory into the process environment.
///
/// Missing files are ignored. Variables already set are not overwritten.
pub fn load_env_file() {
    let _ = dotenvy::dotenv();
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, LogConfig, StoreConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_LOG_DIR,
        ENV_LOG_LEVEL, MAX_BUSY_TIMEOUT_MS,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn missing_database_path_is_rejected() {
        let err = StoreConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_DB_PATH));
    }

    #[test]
    fn blank_database_path_counts_as_missing() {
        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_DB_PATH));
    }

    #[test]
    fn timeout_defaults_to_five_seconds() {
        let config =
            StoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "/tmp/customers.db")])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/customers.db"));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn timeout_is_parsed_as_milliseconds() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "customers.db"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
        ]))
        .unwrap();
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn non_numeric_timeout_is_invalid() {
        let err = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "customers.db"),
            (ENV_BUSY_TIMEOUT_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { variable, .. } if variable == ENV_BUSY_TIMEOUT_MS
        ));
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn timeout_above_sqlite_limit_is_invalid() {
        let at_limit = MAX_BUSY_TIMEOUT_MS.to_string();
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "customers.db"),
            (ENV_BUSY_TIMEOUT_MS, at_limit.as_str()),
        ]))
        .unwrap();
        assert_eq!(config.busy_timeout, Duration::from_millis(MAX_BUSY_TIMEOUT_MS));

        let err = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "customers.db"),
            (ENV_BUSY_TIMEOUT_MS, "3000000000"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { variable, .. } if variable == ENV_BUSY_TIMEOUT_MS
        ));
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn log_config_keeps_only_non_blank_values() {
        let config = LogConfig::from_lookup(lookup_from(&[
            (ENV_LOG_LEVEL, " debug "),
            (ENV_LOG_DIR, ""),
        ]));
        assert_eq!(config.level.as_deref(), Some("debug"));
        assert!(config.log_dir.is_none());
    }
}
