//! Runtime configuration resolved from environment variables.
//!
//! # Responsibility
//! - Provide defaults for database, logging, seeding and scheduling.
//! - Parse and validate overrides from `WORDDB_PATH` and `WORDDAY_*`.
//!
//! # Invariants
//! - A returned `AppConfig` always has a non-empty database path and a
//!   valid schedule time.

use crate::logging::default_log_level;
use chrono::NaiveTime;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "WORDDB_PATH";
pub const ENV_LOG_LEVEL: &str = "WORDDAY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "WORDDAY_LOG_DIR";
pub const ENV_ENGLISH_SEED: &str = "WORDDAY_ENGLISH_SEED";
pub const ENV_HEBREW_SEED: &str = "WORDDAY_HEBREW_SEED";
pub const ENV_SCHEDULE_AT: &str = "WORDDAY_SCHEDULE_AT";
pub const ENV_HISTORY_LIMIT: &str = "WORDDAY_HISTORY_LIMIT";

const DEFAULT_DB_PATH: &str = "words.db";
const DEFAULT_ENGLISH_SEED: &str = "words.txt";
const DEFAULT_HEBREW_SEED: &str = "words_hebrew.txt";
const DEFAULT_HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyValue(&'static str),
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(key) => write!(f, "`{key}` cannot be empty"),
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid `{key}` value `{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

/// Process-wide settings for the word-of-the-day service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rolling log directory; stderr logging when unset.
    pub log_dir: Option<PathBuf>,
    pub english_seed: PathBuf,
    pub hebrew_seed: PathBuf,
    /// UTC wall-clock time the daily job fires.
    pub schedule_at: NaiveTime,
    /// Number of assignments listed by stats.
    pub history_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            english_seed: PathBuf::from(DEFAULT_ENGLISH_SEED),
            hebrew_seed: PathBuf::from(DEFAULT_HEBREW_SEED),
            schedule_at: NaiveTime::MIN,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set-but-invalid keys are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DB_PATH) {
            config.db_path = non_empty_path(ENV_DB_PATH, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            if !value.trim().is_empty() {
                config.log_dir = Some(PathBuf::from(value.trim()));
            }
        }
        if let Some(value) = lookup(ENV_ENGLISH_SEED) {
            config.english_seed = non_empty_path(ENV_ENGLISH_SEED, &value)?;
        }
        if let Some(value) = lookup(ENV_HEBREW_SEED) {
            config.hebrew_seed = non_empty_path(ENV_HEBREW_SEED, &value)?;
        }
        if let Some(value) = lookup(ENV_SCHEDULE_AT) {
            config.schedule_at = parse_schedule_at(&value)?;
        }
        if let Some(value) = lookup(ENV_HISTORY_LIMIT) {
            config.history_limit =
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_HISTORY_LIMIT,
                        value: value.clone(),
                        expected: "a non-negative integer",
                    })?;
        }

        Ok(config)
    }
}

/// Parses an `HH:MM` UTC wall-clock time.
pub fn parse_schedule_at(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ConfigError::InvalidValue {
        key: ENV_SCHEDULE_AT,
        value: value.to_string(),
        expected: "HH:MM",
    })
}

fn non_empty_path(key: &'static str, value: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue(key));
    }
    Ok(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.db_path, PathBuf::from("words.db"));
        assert_eq!(config.schedule_at, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(config.history_limit, 10);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/daily.db"),
            (ENV_SCHEDULE_AT, "06:30"),
            (ENV_HISTORY_LIMIT, "3"),
            (ENV_LOG_DIR, "/var/log/wordday"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/daily.db"));
        assert_eq!(config.schedule_at, NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        assert_eq!(config.history_limit, 3);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/wordday")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_SCHEDULE_AT, "25:00")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_SCHEDULE_AT));

        let err = AppConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyValue(ENV_DB_PATH));

        let err = AppConfig::from_lookup(lookup_from(&[(ENV_HISTORY_LIMIT, "-1")])).unwrap_err();
        assert!(err.to_string().contains(ENV_HISTORY_LIMIT));
    }
}
