//! Service configuration parsed from environment variables.
//!
//! `.env` is loaded by `main` before [`AppConfig::from_env`] runs, so every
//! key below can live there during local development.

use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CHAT_SESSION_IDLE_SECS: u64 = 30 * 60;
const DEFAULT_CHAT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Remote AI/scraping backend settings. Absent when `BACKEND_URL` is unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSessionConfig {
    /// Conversations untouched for this long are dropped.
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub backend: Option<BackendConfig>,
    pub chat: ChatSessionConfig,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `BACKEND_URL`: remote analysis backend; market search falls back
    ///   to direct links when unset
    /// - `BACKEND_REQUEST_TIMEOUT_SECS` / `BACKEND_CONNECT_TIMEOUT_SECS`
    /// - `CHAT_SESSION_IDLE_SECS`: default 1800
    /// - `CHAT_SWEEP_INTERVAL_SECS`: default 60
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing, `PORT` is not a number
    /// or `CHAT_SWEEP_INTERVAL_SECS` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let backend = lookup("BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .map(|base_url| BackendConfig {
                base_url,
                request_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "BACKEND_REQUEST_TIMEOUT_SECS",
                    DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS,
                )),
                connect_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "BACKEND_CONNECT_TIMEOUT_SECS",
                    DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS,
                )),
            });

        let chat = ChatSessionConfig {
            idle_timeout: Duration::from_secs(parse_or(&lookup, "CHAT_SESSION_IDLE_SECS", DEFAULT_CHAT_SESSION_IDLE_SECS)),
            sweep_interval: sweep_interval(&lookup)?,
        };

        Ok(Self {
            database_url,
            port,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            backend,
            chat,
        })
    }
}

impl Default for ChatSessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(DEFAULT_CHAT_SESSION_IDLE_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_CHAT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// The sweeper ticks on this interval, so zero is rejected.
fn sweep_interval(lookup: &impl Fn(&str) -> Option<String>) -> Result<Duration, ConfigError> {
    let secs = parse_or(lookup, "CHAT_SWEEP_INTERVAL_SECS", DEFAULT_CHAT_SWEEP_INTERVAL_SECS);
    if secs == 0 {
        return Err(ConfigError::Invalid { key: "CHAT_SWEEP_INTERVAL_SECS", value: secs.to_string() });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Parse an env var, falling back to `default` when unset or malformed.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    parse_or(&|k: &str| std::env::var(k).ok(), key, default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
