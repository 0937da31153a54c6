use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::Error;
use crate::models::{interval::Interval, request_params::BarsRequest};

/// Turns raw CLI strings into one request per symbol.
pub fn parse_requests(
    symbols: &str,
    interval: &str,
    start: &str,
    end: Option<&str>,
    timeout_secs: Option<u64>,
) -> Result<Vec<BarsRequest>, Error> {
    let interval: Interval = interval
        .parse()
        .map_err(|e: crate::models::interval::IntervalError| Error::Config(e.to_string()))?;
    let start = parse_instant(start)?;
    let end = end.map(parse_instant).transpose()?;
    let timeout = timeout_secs.map(Duration::from_secs);

    // Parse symbols (comma-separated)
    let requests: Vec<BarsRequest> = symbols
        .split(',')
        .map(str::trim)
        .filter(|symbol| !symbol.is_empty())
        .map(|symbol| {
            let mut request = BarsRequest::new(symbol, interval, start);
            request.end = end;
            request.timeout = timeout;
            request
        })
        .collect();

    if requests.is_empty() {
        return Err(Error::Config("no symbols given".to_string()));
    }
    Ok(requests)
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Config(format!("invalid datetime '{raw}': {e}")))
}
