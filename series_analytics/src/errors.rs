use market_data_fetcher::models::interval::Interval;
use thiserror::Error;

/// Errors raised while deriving statistics from a bar series.
#[derive(Debug, Error)]
pub enum DeriveError {
    /// A rolling window needs at least two returns to have a sample
    /// standard deviation.
    #[error("rolling window must be at least 2, got {window}")]
    InvalidWindow { window: usize },

    /// The series is too short to produce even one output row.
    #[error("series has {bars} bars, need at least {needed} for window {window}")]
    InsufficientData {
        bars: usize,
        window: usize,
        needed: usize,
    },

    /// No annualization factor is known for the series interval.
    #[error("no annualization factor for interval {interval}")]
    MissingAnnualization { interval: Interval },

    /// Log returns are undefined for non-positive prices.
    #[error("close price at bar {index} is {close}, must be positive")]
    NonPositiveClose { index: usize, close: f64 },
}
