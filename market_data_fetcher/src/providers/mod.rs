//! Provider abstraction for market data sources.
//!
//! This module defines the [`BarProvider`] trait, which serves as a unified interface
//! for fetching time-series bar data from any market data vendor.
//!
//! Each concrete provider implementation (such as the Binance kline REST
//! provider) implements [`BarProvider`] to handle vendor-specific API logic
//! and validation.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn BarProvider`) for runtime selection of providers; the
//! [`fallback::FallbackChain`] combinator builds on that to try a
//! prioritized list of sources in order.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_fetcher::models::{request_params::BarsRequest, series::Series};
//! use market_data_fetcher::providers::{BarProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl BarProvider for MyProvider {
//!     async fn fetch_bars(&self, request: &BarsRequest) -> Result<Series, ProviderError> {
//!         Ok(Series {
//!             symbol: request.symbol.clone(),
//!             interval: request.interval,
//!             bars: vec![],
//!         })
//!     }
//! }
//! ```

pub mod binance_rest;
pub mod fallback;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar::Bar, request_params::BarsRequest, series::Series};

/// Trait for fetching time-series bar data from a market data provider.
///
/// Implement this trait for each concrete data vendor. The trait is designed
/// for async usage and supports dynamic dispatch (`dyn BarProvider`) for
/// runtime selection of providers.
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// Fetches the complete ordered series for the given request.
    ///
    /// # Arguments
    ///
    /// * `request` - The parameters specifying symbol, interval, and date range.
    ///
    /// # Returns
    ///
    /// * `Ok(Series)` - a gap-free, duplicate-free, chronologically ordered
    ///   series; possibly empty when the source has no data in range.
    /// * `Err(ProviderError)` - if the request fails.
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Series, ProviderError>;
}

/// Runs independent requests concurrently against one provider.
///
/// Pagination inside a single fetch is strictly sequential, but distinct
/// (symbol, interval) fetches share no state and are fanned out together.
/// Results come back in input order so partial success stays inspectable.
pub async fn fetch_all(
    provider: &dyn BarProvider,
    requests: &[BarsRequest],
) -> Vec<Result<Series, ProviderError>> {
    futures::future::join_all(requests.iter().map(|request| provider.fetch_bars(request))).await
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `BarProvider` implementation.
///
/// The taxonomy separates conditions a caller reacts to differently:
/// arguments rejected before any I/O, a live-but-uncooperative source that
/// outlasted the retry budget, a structurally broken payload, a well-formed
/// hard API error, and caller-initiated cancellation. An empty series is
/// *not* an error.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// The request parameters were invalid for this specific provider.
    /// Raised before any request is issued; never retried.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The retry budget ran out against a live but uncooperative source
    /// (timeouts, connection failures, rate limiting).
    #[snafu(display(
        "Source exhausted for {symbol} after {attempts} attempts: {last_error}"
    ))]
    SourceExhausted {
        symbol: String,
        attempts: u32,
        last_error: String,
        backtrace: Backtrace,
    },

    /// The payload violated the expected shape. Reported immediately and
    /// never retried; `partial` holds the bars accumulated before the
    /// failure so callers can inspect how far pagination got.
    #[snafu(display("Malformed response: {message} ({} bars accumulated)", partial.len()))]
    MalformedResponse {
        message: String,
        partial: Vec<Bar>,
        backtrace: Backtrace,
    },

    /// The provider's API returned a well-formed hard error
    /// (e.g., invalid symbol).
    #[snafu(display("API error {code}: {message}"))]
    Api {
        code: i64,
        message: String,
        backtrace: Backtrace,
    },

    /// The caller-supplied deadline elapsed at a retry boundary.
    #[snafu(display("Fetch for {symbol} cancelled: deadline elapsed"))]
    Cancelled {
        symbol: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}
