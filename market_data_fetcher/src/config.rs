//! File-based configuration surface.
//!
//! All knobs are plain parameters; nothing here persists state between
//! runs. Credentials never live in source, they come from this file or the
//! environment and are handed to the provider at construction.

use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::errors::Error;
use crate::providers::binance_rest::BinanceConfig;
use crate::retry::RetryPolicy;

/// TOML-backed fetcher settings. Every field is optional; missing values
/// fall back to [`BinanceConfig::default`].
#[derive(Debug, Default, Deserialize)]
pub struct FetcherConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub page_limit: Option<u32>,
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub requests_per_second: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

impl FetcherConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Merges the file settings over the provider defaults.
    pub fn into_binance(self) -> BinanceConfig {
        let defaults = BinanceConfig::default();
        let retry = RetryPolicy {
            max_retries: self.max_retries.unwrap_or(defaults.retry.max_retries),
            base_delay: self
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.base_delay),
            max_delay: self
                .max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.max_delay),
        };

        BinanceConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            api_key: self
                .api_key
                .map(|key| SecretString::new(key.into())),
            page_limit: self.page_limit.unwrap_or(defaults.page_limit),
            retry,
            requests_per_second: match self.requests_per_second {
                Some(rps) => NonZeroU32::new(rps),
                None => defaults.requests_per_second,
            },
            request_timeout: self
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}
