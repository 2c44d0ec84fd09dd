/// Configuration management for the hotel API
///
/// Settings come from environment variables. A `.env` file is honoured in
/// development (loaded by `main`).
use anyhow::{anyhow, bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Where revoked tokens are tracked
    pub token_store: TokenStoreConfig,
    /// Body message for revoked tokens; the built-in message when unset
    pub revoked_token_message: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStoreConfig {
    /// Process-local store; revocations are not shared between instances
    Memory,
    Redis(RedisConfig),
}

/// Redis settings for the revocation store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub url: String,
    /// Bound on the initial connection at startup
    pub connect_timeout: Duration,
    /// Bound on each lookup/write; lookups that exceed it fail open
    pub operation_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("unknown log format '{}', expected text or json", other)),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a
    /// variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let app = AppConfig {
            env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            host: lookup("HOTEL_API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "HOTEL_API_PORT", 8080)?,
        };

        let store_kind = lookup("TOKEN_STORE").unwrap_or_else(|| "redis".to_string());
        let token_store = match store_kind.to_ascii_lowercase().as_str() {
            "memory" => TokenStoreConfig::Memory,
            "redis" => TokenStoreConfig::Redis(RedisConfig {
                url: lookup("REDIS_URL").context("REDIS_URL must be set when TOKEN_STORE=redis")?,
                connect_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "REDIS_CONNECT_TIMEOUT_MS",
                    2000,
                )?),
                operation_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "REDIS_OPERATION_TIMEOUT_MS",
                    100,
                )?),
            }),
            other => bail!("Invalid TOKEN_STORE '{}', expected redis or memory", other),
        };

        let revoked_token_message = lookup("REVOKED_TOKEN_MESSAGE").filter(|m| !m.trim().is_empty());

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().context("Invalid LOG_FORMAT")?,
            None => LogFormat::Text,
        };

        Ok(Config {
            app,
            token_store,
            revoked_token_message,
            log_format,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
