use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Base URL of the HRMS REST API (directory + attendance store).
    pub hrms_api_url: String,
    pub request_timeout: Duration,

    // Rate limiting
    pub rate_mark_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));
        let number = |key: &str, default: u64| -> Result<u64> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}")),
                None => Ok(default),
            }
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            hrms_api_url: required("HRMS_API_URL")?,
            request_timeout: Duration::from_secs(number("REQUEST_TIMEOUT_SECS", 10)?), // default 10 s
            rate_mark_per_min: u32::try_from(number("RATE_MARK_PER_MIN", 120)?)
                .context("RATE_MARK_PER_MIN is too large")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}
