//! Binance kline (candlestick) REST provider.
//!
//! Fetches `/api/v3/klines` in a paging loop with bounded, rate-limit-aware
//! retry, then assembles the pages into one ordered, deduplicated,
//! window-filtered [`Series`](crate::models::series::Series).

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{BinanceConfig, BinanceProvider};
