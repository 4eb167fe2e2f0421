//! Environment configuration.

use std::str::FromStr;

/// Runtime configuration read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file, or `:memory:` for a throwaway database.
    pub database_path: String,
    /// Maximum number of due items pulled into a new session.
    pub session_limit: usize,
    /// Seconds a finished session stays readable before it is dropped from memory.
    pub session_retention_secs: u32,
    pub seed_sample_items: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: "srs.db".to_string(),
            session_limit: 50,
            session_retention_secs: 900,
            seed_sample_items: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            database_path: lookup("DATABASE_PATH").unwrap_or(defaults.database_path),
            session_limit: parse_or("SESSION_LIMIT", lookup("SESSION_LIMIT"), defaults.session_limit),
            session_retention_secs: parse_or(
                "SESSION_RETENTION_SECS",
                lookup("SESSION_RETENTION_SECS"),
                defaults.session_retention_secs,
            ),
            seed_sample_items: parse_or(
                "SEED_SAMPLE_ITEMS",
                lookup("SEED_SAMPLE_ITEMS"),
                defaults.seed_sample_items,
            ),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring invalid configuration value");
            default
        }),
    }
}
