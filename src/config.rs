use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_LEDGER_URL: &str = "http://127.0.0.1:5000";

/// Highest nonce tried for a single job.
pub const DEFAULT_SEARCH_CAP: u64 = 10_000_000;

/// Nonces hashed between two looks at the cancellation token.
pub const DEFAULT_CANCEL_CHECK_INTERVAL: u64 = 4096;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerConfig {
    pub ledger_url: String,
    pub miner_address: String,
    pub search_cap: u64,
    pub cancel_check_interval: u64,
    pub http_timeout: Duration,
    pub strict_chain: bool,
    pub host: String,
    pub port: u16,
}

impl MinerConfig {
    /// Defaults for everything except the two values with no sensible default.
    pub fn new(ledger_url: impl Into<String>, miner_address: impl Into<String>) -> Self {
        Self {
            ledger_url: ledger_url.into(),
            miner_address: miner_address.into(),
            search_cap: DEFAULT_SEARCH_CAP,
            cancel_check_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            strict_chain: false,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let miner_address = get("MINER_ADDRESS").ok_or(ConfigError::Missing("MINER_ADDRESS"))?;
        let ledger_url = get("LEDGER_URL").unwrap_or_else(|| DEFAULT_LEDGER_URL.to_string());
        if !ledger_url.starts_with("http://") && !ledger_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "LEDGER_URL",
                value: ledger_url,
                reason: "expected an http(s) URL".into(),
            });
        }

        let mut config = Self::new(ledger_url, miner_address);
        config.search_cap = parse(get("SEARCH_CAP"), "SEARCH_CAP", DEFAULT_SEARCH_CAP)?;
        config.cancel_check_interval = parse(
            get("CANCEL_CHECK_INTERVAL"),
            "CANCEL_CHECK_INTERVAL",
            DEFAULT_CANCEL_CHECK_INTERVAL,
        )?;
        if config.cancel_check_interval == 0 {
            return Err(ConfigError::Invalid {
                key: "CANCEL_CHECK_INTERVAL",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        let timeout_secs: u64 = parse(
            get("LEDGER_TIMEOUT_SECS"),
            "LEDGER_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        config.http_timeout = Duration::from_secs(timeout_secs);
        config.strict_chain = parse_flag(get("STRICT_CHAIN"), "STRICT_CHAIN")?;
        config.host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        config.port = parse(get("PORT"), "PORT", DEFAULT_PORT)?;
        Ok(config)
    }
}

fn parse<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_flag(raw: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected true or false".into(),
        }),
    }
}
