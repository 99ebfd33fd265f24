//! Application settings loaded from environment variables.

use std::env;
use std::time::Duration;

use super::constants::{
    DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DATABASE_URL,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS, LEGACY_DATABASE_URL_VAR,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    /// Upper bound on a single unit of work; `None` lets it run to completion.
    pub transaction_timeout: Option<Duration>,
    pub sql_logging: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("transaction_timeout", &self.transaction_timeout)
            .field("sql_logging", &self.sql_logging)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup(LEGACY_DATABASE_URL_VAR))
            .unwrap_or_else(|| {
                tracing::warn!("DATABASE_URL not set, using development default");
                DEFAULT_DATABASE_URL.to_string()
            });

        Self {
            database_url,
            max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            min_connections: parsed("DATABASE_MIN_CONNECTIONS")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_MIN_CONNECTIONS),
            connect_timeout: Duration::from_secs(
                parsed("DATABASE_CONNECT_TIMEOUT_SECS").unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            acquire_timeout: Duration::from_secs(
                parsed("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            ),
            transaction_timeout: parsed("DATABASE_TRANSACTION_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            sql_logging: lookup("DATABASE_SQL_LOGGING")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Same settings, different database (used by the test harness).
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }
}
