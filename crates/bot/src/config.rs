//! Bot configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TELEGRAM_BOT_TOKEN` - Telegram Bot API token
//! - `MENU_FEED_URL` - URL of the CSV menu feed
//!
//! ## Optional
//! - `USERS_FILE` - Path of the identity store (default: users.json)
//! - `ADDRESSES_FILE` - Path of the address catalog (default: addresses.json)
//! - `ORDERS_FILE` - Path of the order ledger (default: orders.csv)
//! - `SAME_DAY_CUTOFF` - `HH:MM` after which today is no longer offered in
//!   the date picker; unset disables the cutoff
//! - `POLL_TIMEOUT_SECS` - Long-polling timeout (default: 30)

use std::path::PathBuf;

use chrono::NaiveTime;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Bot application configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// Telegram Bot API token.
    pub bot_token: SecretString,
    /// URL of the CSV menu feed.
    pub menu_feed_url: String,
    /// Path of the identity store file.
    pub users_file: PathBuf,
    /// Path of the address catalog file.
    pub addresses_file: PathBuf,
    /// Path of the order ledger file.
    pub orders_file: PathBuf,
    /// Local time after which same-day orders are no longer offered.
    pub same_day_cutoff: Option<NaiveTime>,
    /// Long-polling timeout in seconds.
    pub poll_timeout_secs: u64,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"[REDACTED]")
            .field("menu_feed_url", &self.menu_feed_url)
            .field("users_file", &self.users_file)
            .field("addresses_file", &self.addresses_file)
            .field("orders_file", &self.orders_file)
            .field("same_day_cutoff", &self.same_day_cutoff)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let bot_token = SecretString::from(get_required_env("TELEGRAM_BOT_TOKEN")?);
        let menu_feed_url = get_required_env("MENU_FEED_URL")?;
        let users_file = PathBuf::from(get_env_or_default("USERS_FILE", "users.json"));
        let addresses_file = PathBuf::from(get_env_or_default("ADDRESSES_FILE", "addresses.json"));
        let orders_file = PathBuf::from(get_env_or_default("ORDERS_FILE", "orders.csv"));

        let same_day_cutoff = get_optional_env("SAME_DAY_CUTOFF")
            .map(|raw| parse_cutoff(&raw))
            .transpose()?;

        let poll_timeout_secs = get_env_or_default("POLL_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("POLL_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            bot_token,
            menu_feed_url,
            users_file,
            addresses_file,
            orders_file,
            same_day_cutoff,
            poll_timeout_secs,
        })
    }
}

/// Parse a `HH:MM` cutoff time.
fn parse_cutoff(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|e| ConfigError::InvalidEnvVar("SAME_DAY_CUTOFF".to_string(), e.to_string()))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cutoff_valid() {
        let cutoff = parse_cutoff("10:00").unwrap();
        assert_eq!(cutoff, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_cutoff_invalid() {
        assert!(matches!(
            parse_cutoff("ten o'clock"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_cutoff("25:00").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = BotConfig {
            bot_token: SecretString::from("123456:super-secret-token"),
            menu_feed_url: "https://example.com/menu.csv".to_string(),
            users_file: PathBuf::from("users.json"),
            addresses_file: PathBuf::from("addresses.json"),
            orders_file: PathBuf::from("orders.csv"),
            same_day_cutoff: None,
            poll_timeout_secs: 30,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-token"));
        assert!(debug_output.contains("https://example.com/menu.csv"));
    }
}
