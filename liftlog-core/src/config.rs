use log::{LevelFilter, debug};
use std::env;
use std::path::PathBuf;

use crate::logging::parse_level;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://liftlog.db";

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityConfig {
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub identity: Option<IdentityConfig>,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            identity: None,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            identity: get("LIFTLOG_EMAIL").map(|email| IdentityConfig {
                email,
                full_name: get("LIFTLOG_NAME"),
            }),
            log_level: get("LIFTLOG_LOG_LEVEL")
                .and_then(|l| parse_level(&l))
                .unwrap_or(defaults.log_level),
            log_file: get("LIFTLOG_LOG_FILE").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite://other.db"),
            ("LIFTLOG_EMAIL", "ana@example.com"),
            ("LIFTLOG_NAME", " "),
            ("LIFTLOG_LOG_LEVEL", "warning"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.database_url, "sqlite://other.db");
        assert_eq!(
            config.identity,
            Some(IdentityConfig {
                email: "ana@example.com".into(),
                full_name: None,
            })
        );
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.log_file, None);
    }
}
