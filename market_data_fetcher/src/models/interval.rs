use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntervalError {
    #[error("Unknown interval '{input}', expected one of 1m 3m 5m 15m 30m 1h 2h 4h 6h 8h 12h 1d 3d 1w 1M")]
    Unknown { input: String },
}

/// The fixed bar width of a kline series.
///
/// This is a closed enumeration of the widths the kline endpoint accepts;
/// an invalid width is unrepresentable, so interval validation happens at
/// the parse boundary (CLI, config) rather than inside the fetch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "3m")]
    Min3,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "8h")]
    Hour8,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "3d")]
    Day3,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl Interval {
    /// The wire representation used in query strings.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Interval::Min1 => "1m",
            Interval::Min3 => "3m",
            Interval::Min5 => "5m",
            Interval::Min15 => "15m",
            Interval::Min30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Hour2 => "2h",
            Interval::Hour4 => "4h",
            Interval::Hour6 => "6h",
            Interval::Hour8 => "8h",
            Interval::Hour12 => "12h",
            Interval::Day1 => "1d",
            Interval::Day3 => "3d",
            Interval::Week1 => "1w",
            Interval::Month1 => "1M",
        }
    }

    /// Nominal width of one bar.
    ///
    /// A month is approximated as 30 days. The value is only used to force
    /// a minimal cursor step when a source refuses to advance, never for
    /// arithmetic on returned data.
    pub fn step(&self) -> Duration {
        match self {
            Interval::Min1 => Duration::minutes(1),
            Interval::Min3 => Duration::minutes(3),
            Interval::Min5 => Duration::minutes(5),
            Interval::Min15 => Duration::minutes(15),
            Interval::Min30 => Duration::minutes(30),
            Interval::Hour1 => Duration::hours(1),
            Interval::Hour2 => Duration::hours(2),
            Interval::Hour4 => Duration::hours(4),
            Interval::Hour6 => Duration::hours(6),
            Interval::Hour8 => Duration::hours(8),
            Interval::Hour12 => Duration::hours(12),
            Interval::Day1 => Duration::days(1),
            Interval::Day3 => Duration::days(3),
            Interval::Week1 => Duration::weeks(1),
            Interval::Month1 => Duration::days(30),
        }
    }

    pub const fn all() -> [Interval; 15] {
        [
            Interval::Min1,
            Interval::Min3,
            Interval::Min5,
            Interval::Min15,
            Interval::Min30,
            Interval::Hour1,
            Interval::Hour2,
            Interval::Hour4,
            Interval::Hour6,
            Interval::Hour8,
            Interval::Hour12,
            Interval::Day1,
            Interval::Day3,
            Interval::Week1,
            Interval::Month1,
        ]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::all()
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| IntervalError::Unknown {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_interval_through_from_str() {
        for interval in Interval::all() {
            let parsed: Interval = interval.as_str().parse().unwrap();
            assert_eq!(parsed, interval);
        }
    }

    #[test]
    fn rejects_unknown_interval() {
        assert!("2d".parse::<Interval>().is_err());
        assert!("".parse::<Interval>().is_err());
        // case matters: 1M is monthly, 1m is minutes
        assert_eq!("1M".parse::<Interval>().unwrap(), Interval::Month1);
        assert_eq!("1m".parse::<Interval>().unwrap(), Interval::Min1);
    }

    #[test]
    fn step_is_positive_for_all_intervals() {
        for interval in Interval::all() {
            assert!(interval.step() > Duration::zero());
        }
    }
}
