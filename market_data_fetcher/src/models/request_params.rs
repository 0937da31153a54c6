use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::interval::Interval;

/// Universal parameters for requesting time-series bar data from any market data provider.
///
/// This struct is designed to be vendor-agnostic and is the standard input
/// for all [`BarProvider`](crate::providers::BarProvider) implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequest {
    /// The symbol to request (e.g., `"BTCUSDT"`, `"ETHUSDT"`).
    pub symbol: String,

    /// The time interval for each bar (e.g., 1 minute, 1 day).
    pub interval: Interval,

    /// Start of the requested time range (inclusive, UTC).
    ///
    /// Providers return bars starting at or after this timestamp.
    pub start: DateTime<Utc>,

    /// End of the requested time range (exclusive, UTC).
    ///
    /// When absent, "now" at the moment the fetch is issued is used.
    pub end: Option<DateTime<Utc>>,

    /// Overall deadline for the whole fetch, including backoff sleeps.
    ///
    /// Checked before every request and before every sleep, so a long
    /// backoff sequence can be abandoned promptly. `None` means no
    /// deadline beyond per-request HTTP timeouts.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl BarsRequest {
    pub fn new(symbol: impl Into<String>, interval: Interval, start: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start,
            end: None,
            timeout: None,
        }
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The effective exclusive end bound at call time.
    pub fn resolved_end(&self) -> DateTime<Utc> {
        self.end.unwrap_or_else(Utc::now)
    }
}
