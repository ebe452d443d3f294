//! Startup settings resolved from the environment, with per-user defaults.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::store::DEFAULT_SEED_ATTEMPTS;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".personal-library";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Log file name stored inside the application data directory.
const LOG_FILE_NAME: &str = "library.log";
/// Filter used when `LIBRARY_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

pub const DATA_DIR_ENV: &str = "LIBRARY_DATA_DIR";
pub const SEED_FILE_ENV: &str = "LIBRARY_SEED_FILE";
pub const SEED_ATTEMPTS_ENV: &str = "LIBRARY_SEED_ATTEMPTS";
pub const LOG_ENV: &str = "LIBRARY_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Seed file to use instead of the built-in default books.
    pub seed_file: Option<PathBuf>,
    pub seed_attempts: u32,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve the config through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match non_empty(lookup(DATA_DIR_ENV)) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let seed_attempts = match non_empty(lookup(SEED_ATTEMPTS_ENV)) {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("{SEED_ATTEMPTS_ENV} must be a whole number"))?,
            None => DEFAULT_SEED_ATTEMPTS,
        };

        Ok(Self {
            data_dir,
            seed_file: non_empty(lookup(SEED_FILE_ENV)).map(PathBuf::from),
            seed_attempts,
            log_filter: non_empty(lookup(LOG_ENV)).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_come_from_lookup() {
        let config = AppConfig::from_lookup(|key| match key {
            DATA_DIR_ENV => Some("/tmp/shelf".to_string()),
            SEED_FILE_ENV => Some("/tmp/seed.json".to_string()),
            SEED_ATTEMPTS_ENV => Some("5".to_string()),
            LOG_ENV => Some("debug".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.db_path(), PathBuf::from("/tmp/shelf/library.sqlite"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/shelf/library.log"));
        assert_eq!(config.seed_file, Some(PathBuf::from("/tmp/seed.json")));
        assert_eq!(config.seed_attempts, 5);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn blank_values_use_defaults() {
        let config = AppConfig::from_lookup(|key| match key {
            DATA_DIR_ENV => Some("/tmp/shelf".to_string()),
            _ => Some("  ".to_string()),
        })
        .unwrap();

        assert_eq!(config.seed_file, None);
        assert_eq!(config.seed_attempts, DEFAULT_SEED_ATTEMPTS);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn bad_attempt_count_is_an_error() {
        let result = AppConfig::from_lookup(|key| match key {
            DATA_DIR_ENV => Some("/tmp/shelf".to_string()),
            SEED_ATTEMPTS_ENV => Some("three".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }
}
