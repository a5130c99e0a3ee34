use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::api::NbpClient;
use crate::services::rate_cache::DEFAULT_TTL;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set in .env file")]
    Missing(&'static str),

    #[error("{name} must be a positive number of seconds, got '{value}'")]
    InvalidSeconds { name: &'static str, value: String },

    #[error("WALLET_USERS entry '{0}' is not of the form credential=user_id")]
    InvalidUserEntry(String),
}

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub nbp_base_url: String,
    pub rate_ttl: Duration,
    pub rate_fetch_timeout: Duration,
    pub storage_timeout: Duration,
    /// Static credential -> user id table; `None` leaves the gate open
    pub wallet_users: Option<HashMap<String, String>>,
}

impl Config {
    pub const DEFAULT_DATABASE_URL: &'static str = "sqlite://data/wallet.db?mode=rwc";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let seconds = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(name) {
                None => Ok(Duration::from_secs(default)),
                Some(value) => match value.trim().parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                    _ => Err(ConfigError::InvalidSeconds { name, value }),
                },
            }
        };

        let wallet_users = match lookup("WALLET_USERS") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_wallet_users(&raw)?),
            _ => None,
        };

        Ok(Self {
            discord_token,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_string()),
            nbp_base_url: lookup("NBP_BASE_URL").unwrap_or_else(|| NbpClient::DEFAULT_BASE_URL.to_string()),
            rate_ttl: seconds("RATE_CACHE_TTL_SECS", DEFAULT_TTL.as_secs())?,
            rate_fetch_timeout: seconds("RATE_FETCH_TIMEOUT_SECS", 10)?,
            storage_timeout: seconds("STORAGE_TIMEOUT_SECS", 5)?,
            wallet_users,
        })
    }
}

/// Parse `credential=user_id,credential=user_id`
pub fn parse_wallet_users(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((credential, user)) if !credential.trim().is_empty() && !user.trim().is_empty() => {
                Ok((credential.trim().to_string(), user.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidUserEntry(entry.to_string())),
        })
        .collect()
}
