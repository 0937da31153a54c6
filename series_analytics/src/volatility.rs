//! Log returns and rolling annualized volatility.
//!
//! For a series of closes `c[0..n]` the log return at bar `i` is
//! `ln(c[i] / c[i-1])`. Rolling statistics at bar `i` cover the `window`
//! most recent returns ending at `i`, so the first fully-covered bar is
//! index `window` and the output has `n - window` rows.
//!
//! Volatility is the sample standard deviation of the windowed returns
//! scaled by the square root of the bars-per-year factor for the series
//! interval. The rolling mean is the moving average of the same count of
//! closes ending at the bar.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use market_data_fetcher::models::{interval::Interval, series::Series};

use crate::errors::DeriveError;
use crate::rolling::{mean, sample_stdev};

/// One output row: the source bar's close plus its derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedBar {
    /// Open time of the source bar, UTC.
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    /// Log return against the previous bar's close.
    pub log_return: f64,
    /// Annualized sample standard deviation of the trailing return window.
    pub rolling_volatility: f64,
    /// Mean close over the trailing window, the moving-average overlay.
    pub rolling_mean: f64,
}

/// Derived statistics for one symbol, aligned to the tail of the input
/// series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    pub symbol: String,
    pub interval: Interval,
    pub window: usize,
    pub rows: Vec<DerivedBar>,
}

/// Bars-per-year factors keyed by interval, used to annualize per-bar
/// volatility. Insertion order is kept so serialized output lists the
/// intervals smallest first.
#[derive(Debug, Clone)]
pub struct AnnualizationTable {
    factors: IndexMap<Interval, f64>,
}

impl Default for AnnualizationTable {
    /// Crypto-market convention: trading never pauses, so a year holds
    /// 365 daily bars and every finer interval scales off that.
    fn default() -> Self {
        let mut factors = IndexMap::new();
        factors.insert(Interval::Min1, 365.0 * 24.0 * 60.0);
        factors.insert(Interval::Min3, 365.0 * 24.0 * 20.0);
        factors.insert(Interval::Min5, 365.0 * 24.0 * 12.0);
        factors.insert(Interval::Min15, 365.0 * 24.0 * 4.0);
        factors.insert(Interval::Min30, 365.0 * 24.0 * 2.0);
        factors.insert(Interval::Hour1, 365.0 * 24.0);
        factors.insert(Interval::Hour2, 365.0 * 12.0);
        factors.insert(Interval::Hour4, 365.0 * 6.0);
        factors.insert(Interval::Hour6, 365.0 * 4.0);
        factors.insert(Interval::Hour8, 365.0 * 3.0);
        factors.insert(Interval::Hour12, 365.0 * 2.0);
        factors.insert(Interval::Day1, 365.0);
        factors.insert(Interval::Day3, 365.0 / 3.0);
        factors.insert(Interval::Week1, 52.0);
        factors.insert(Interval::Month1, 12.0);
        Self { factors }
    }
}

impl AnnualizationTable {
    pub fn empty() -> Self {
        Self {
            factors: IndexMap::new(),
        }
    }

    pub fn get(&self, interval: Interval) -> Option<f64> {
        self.factors.get(&interval).copied()
    }

    /// Inserts or overrides the factor for one interval, e.g. 252 trading
    /// days for equity-style daily bars.
    pub fn set(&mut self, interval: Interval, bars_per_year: f64) -> &mut Self {
        self.factors.insert(interval, bars_per_year);
        self
    }
}

/// Derives rolling statistics using the factor for the series interval
/// from `table`.
pub fn derive_with_table(
    series: &Series,
    window: usize,
    table: &AnnualizationTable,
) -> Result<DerivedSeries, DeriveError> {
    let factor = table
        .get(series.interval)
        .ok_or(DeriveError::MissingAnnualization {
            interval: series.interval,
        })?;
    derive(series, window, factor)
}

/// Derives rolling statistics with an explicit bars-per-year factor.
pub fn derive(series: &Series, window: usize, factor: f64) -> Result<DerivedSeries, DeriveError> {
    if window < 2 {
        return Err(DeriveError::InvalidWindow { window });
    }
    let n = series.len();
    // one output row needs `window` returns, i.e. window + 1 bars
    let needed = window + 1;
    if n < needed {
        return Err(DeriveError::InsufficientData {
            bars: n,
            window,
            needed,
        });
    }

    for (index, bar) in series.bars.iter().enumerate() {
        if bar.close <= 0.0 {
            return Err(DeriveError::NonPositiveClose {
                index,
                close: bar.close,
            });
        }
    }

    // returns[i - 1] is the log return at bar i
    let returns: Vec<f64> = series
        .bars
        .windows(2)
        .map(|pair| (pair[1].close / pair[0].close).ln())
        .collect();

    let closes = series.closes();
    let annualize = factor.sqrt();
    let rows = (window..n)
        .map(|i| {
            let trailing_returns = &returns[i - window..i];
            let trailing_closes = &closes[i - window + 1..=i];
            DerivedBar {
                timestamp: series.bars[i].timestamp,
                close: series.bars[i].close,
                log_return: returns[i - 1],
                rolling_volatility: sample_stdev(trailing_returns) * annualize,
                rolling_mean: mean(trailing_closes),
            }
        })
        .collect();

    Ok(DerivedSeries {
        symbol: series.symbol.clone(),
        interval: series.interval,
        window,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_interval() {
        let table = AnnualizationTable::default();
        for interval in Interval::all() {
            assert!(table.get(interval).is_some(), "missing {interval}");
        }
        assert_eq!(table.get(Interval::Day1), Some(365.0));
        assert_eq!(table.get(Interval::Hour1), Some(8760.0));
    }

    #[test]
    fn set_overrides_a_factor() {
        let mut table = AnnualizationTable::default();
        table.set(Interval::Day1, 252.0);
        assert_eq!(table.get(Interval::Day1), Some(252.0));
    }
}
