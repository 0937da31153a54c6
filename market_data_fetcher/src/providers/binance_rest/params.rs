use snafu::ensure;

use crate::models::request_params::BarsRequest;
use crate::providers::{ProviderError, ValidationSnafu};

/// Validates a request before any I/O happens.
///
/// Interval widths are a closed enum and need no checking here; what can
/// still go wrong is an empty symbol or an inverted time range.
pub fn validate_request(request: &BarsRequest) -> Result<(), ProviderError> {
    ensure!(
        !request.symbol.trim().is_empty(),
        ValidationSnafu {
            message: "symbol must be a non-empty identifier",
        }
    );
    if let Some(end) = request.end {
        ensure!(
            end > request.start,
            ValidationSnafu {
                message: format!("end {} must be after start {}", end, request.start),
            }
        );
    }
    Ok(())
}

/// Builds the query string for one kline page.
///
/// `endTime` filters on open time inclusively on the Binance side; the
/// final `[start, end)` window filter happens during assembly, so passing
/// the exclusive bound straight through is fine.
pub fn page_query(
    request: &BarsRequest,
    cursor_ms: i64,
    end_ms: i64,
    limit: u32,
) -> Vec<(String, String)> {
    vec![
        ("symbol".to_string(), request.symbol.to_uppercase()),
        ("interval".to_string(), request.interval.as_str().to_string()),
        ("startTime".to_string(), cursor_ms.to_string()),
        ("endTime".to_string(), end_ms.to_string()),
        ("limit".to_string(), limit.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::models::interval::Interval;

    fn request() -> BarsRequest {
        BarsRequest::new(
            "btcusdt",
            Interval::Hour1,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn rejects_empty_symbol() {
        let mut req = request();
        req.symbol = "   ".to_string();
        assert!(matches!(
            validate_request(&req),
            Err(ProviderError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        let req = request().with_end(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        assert!(matches!(
            validate_request(&req),
            Err(ProviderError::Validation { .. })
        ));
    }

    #[test]
    fn accepts_open_ended_request() {
        assert!(validate_request(&request()).is_ok());
    }

    #[test]
    fn query_uppercases_symbol_and_carries_cursor() {
        let query = page_query(&request(), 1_000, 2_000, 500);
        assert!(query.contains(&("symbol".to_string(), "BTCUSDT".to_string())));
        assert!(query.contains(&("interval".to_string(), "1h".to_string())));
        assert!(query.contains(&("startTime".to_string(), "1000".to_string())));
        assert!(query.contains(&("endTime".to_string(), "2000".to_string())));
        assert!(query.contains(&("limit".to_string(), "500".to_string())));
    }
}
