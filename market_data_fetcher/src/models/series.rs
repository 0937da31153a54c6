//! A collection of time-series bars for a specific symbol and interval.

use serde::{Deserialize, Serialize};

use crate::models::{bar::Bar, interval::Interval};

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`Interval`], making the data set self-describing.
///
/// A series returned by a provider satisfies three invariants: timestamps
/// are strictly increasing, there are no duplicate timestamps, and every
/// timestamp lies inside the requested `[start, end)` window. An *empty*
/// series is a valid success value and means the source had no data in
/// range; it is deliberately distinct from any fetch failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// The symbol this data represents (e.g., "BTCUSDT").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub interval: Interval,
    /// The collection of OHLCV bars, in chronological order.
    pub bars: Vec<Bar>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Closing prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }
}
