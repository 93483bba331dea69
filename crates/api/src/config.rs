//! Application configuration loaded from environment variables.

use std::time::Duration;

use common::TransitionPolicy;
use thiserror::Error;

/// A variable was set but could not be used.
#[derive(Debug, Error)]
#[error("invalid value for {name}: {value:?} ({reason})")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: Postgres connection string; unset selects the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `TRANSITION_POLICY`: `terminal-only` or `forward` (default: `terminal-only`)
/// - `NOTIFY_WEBHOOK_URL`: webhook for status notifications; unset selects
///   the in-process broadcast channel
/// - `NOTIFY_TIMEOUT_MS`: bound on each notification (default: `2000`)
/// - `NOTIFY_CHANNEL_CAPACITY`: broadcast buffer size (default: `64`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub transition_policy: TransitionPolicy,
    pub notify_webhook_url: Option<String>,
    pub notify_timeout: Duration,
    pub notify_channel_capacity: usize,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse(&var, "PORT")?.unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: var("DATABASE_URL"),
            database_max_connections: parse(&var, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.database_max_connections),
            transition_policy: parse(&var, "TRANSITION_POLICY")?
                .unwrap_or(defaults.transition_policy),
            notify_webhook_url: var("NOTIFY_WEBHOOK_URL"),
            notify_timeout: parse(&var, "NOTIFY_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.notify_timeout),
            notify_channel_capacity: parse(&var, "NOTIFY_CHANNEL_CAPACITY")?
                .unwrap_or(defaults.notify_channel_capacity),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T, F>(var: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError {
                name,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            transition_policy: TransitionPolicy::TerminalOnly,
            notify_webhook_url: None,
            notify_timeout: Duration::from_millis(2000),
            notify_channel_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.database_url, None);
        assert_eq!(config.transition_policy, TransitionPolicy::TerminalOnly);
        assert_eq!(config.notify_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/orders"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("TRANSITION_POLICY", "forward"),
            ("NOTIFY_WEBHOOK_URL", "http://hooks.local/orders"),
            ("NOTIFY_TIMEOUT_MS", "250"),
            ("NOTIFY_CHANNEL_CAPACITY", "8"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/orders"));
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(config.transition_policy, TransitionPolicy::Forward);
        assert_eq!(config.notify_webhook_url.as_deref(), Some("http://hooks.local/orders"));
        assert_eq!(config.notify_timeout, Duration::from_millis(250));
        assert_eq!(config.notify_channel_capacity, 8);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = from_pairs(&[("DATABASE_URL", ""), ("PORT", " ")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = from_pairs(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.name, "PORT");

        let err = from_pairs(&[("TRANSITION_POLICY", "anything-goes")]).unwrap_err();
        assert_eq!(err.name, "TRANSITION_POLICY");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
