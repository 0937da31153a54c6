//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! This struct is used as the standard output for all [`BarProvider`](crate::providers::BarProvider)
//! implementations, regardless of venue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single time-series bar (OHLCV) for a given timestamp.
///
/// This struct is vendor-agnostic and is used throughout the fetch pipeline.
///
/// Price invariant: `low <= {open, close} <= high`, all prices positive,
/// `volume >= 0`. Providers enforce this while decoding and reject
/// violating rows as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The instant the bar *opened* (UTC).
    ///
    /// Sources disagree on whether a candle is labelled by its open or its
    /// close; this crate fixes the convention to open time everywhere.
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: f64,

    /// Trade count for the bar. Not all providers supply this.
    pub trade_count: Option<u64>,
}
