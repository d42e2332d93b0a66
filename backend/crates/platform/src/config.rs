//! Environment Configuration
//!
//! Typed reads of environment variables. [`Env`] abstracts the lookup so
//! configuration parsing can be tested without touching the process
//! environment.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: String, reason: String },
}

/// Source of configuration values.
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Read from the process environment (after `dotenvy` has run).
    pub fn process() -> Self {
        Self { overrides: None }
    }

    /// Fixed set of values; nothing falls through to the process environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            overrides: Some(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Raw value; empty strings count as unset.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn require(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    pub fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    pub fn parse_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    pub fn secs_or(&self, name: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.parse_or(name, default.as_secs())
            .map(Duration::from_secs)
    }

    pub fn millis_or(&self, name: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.parse_or(name, default.as_millis() as u64)
            .map(Duration::from_millis)
    }

    /// Comma-separated list, trimmed, empties dropped.
    pub fn list_or(&self, name: &str, default: &str) -> Vec<String> {
        self.or(name, default)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        let env = Env::from_pairs([("DATABASE_URL", "postgres://x"), ("EMPTY", "  ")]);
        assert_eq!(env.require("DATABASE_URL").unwrap(), "postgres://x");
        assert_eq!(
            env.require("EMPTY"),
            Err(ConfigError::Missing("EMPTY".to_string()))
        );
        assert!(env.require("ABSENT").is_err());
    }

    #[test]
    fn test_durations() {
        let env = Env::from_pairs([("TTL", "900"), ("TIMEOUT", "250"), ("BAD", "soon")]);
        assert_eq!(
            env.secs_or("TTL", Duration::from_secs(1)).unwrap(),
            Duration::from_secs(900)
        );
        assert_eq!(
            env.millis_or("TIMEOUT", Duration::from_secs(2)).unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(
            env.secs_or("MISSING", Duration::from_secs(7)).unwrap(),
            Duration::from_secs(7)
        );
        assert!(matches!(
            env.secs_or("BAD", Duration::from_secs(1)),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_list() {
        let env = Env::from_pairs([("ORIGINS", "http://a, ,http://b ")]);
        assert_eq!(env.list_or("ORIGINS", ""), vec!["http://a", "http://b"]);
        assert_eq!(env.list_or("NONE", "http://c"), vec!["http://c"]);
    }
}
