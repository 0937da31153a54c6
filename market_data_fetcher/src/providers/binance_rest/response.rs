//! Decoding of kline payloads.
//!
//! A successful kline response is a JSON array of fixed-arity arrays:
//! `[openTime, open, high, low, close, volume, closeTime, quoteVolume,
//! trades, ...]` with prices serialized as strings. Error conditions come
//! back as `{"code": <i64>, "msg": <string>}` objects, where a handful of
//! codes mean "too many requests" rather than a hard failure. Anything
//! outside those two shapes is malformed and must not be silently skipped.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::models::bar::Bar;

/// In-body error codes that signal rate limiting rather than a hard error.
/// -1003 is TOO_MANY_REQUESTS, -1015 is TOO_MANY_ORDERS.
const RATE_LIMIT_CODES: [i64; 2] = [-1003, -1015];

/// A payload shape violation, described for the caller.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

/// One decoded kline row: the canonical bar plus the close time the
/// pagination cursor advances by.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub bar: Bar,
    pub close_time_ms: i64,
}

/// The three well-formed shapes a kline response body can take.
#[derive(Debug)]
pub enum KlinesPayload {
    /// A (possibly empty) page of bars.
    Bars(Vec<RawBar>),
    /// An in-body rate-limit signal; the page should be retried.
    RateLimited { code: i64 },
    /// A well-formed hard API error, e.g. invalid symbol.
    ApiError { code: i64, message: String },
}

/// Decodes one response body into a [`KlinesPayload`].
pub fn decode_klines(body: &[u8]) -> Result<KlinesPayload, DecodeError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| DecodeError(format!("response is not valid JSON: {e}")))?;

    match value {
        Value::Array(rows) => {
            let mut bars = Vec::with_capacity(rows.len());
            for (index, row) in rows.iter().enumerate() {
                let raw = parse_kline(row)
                    .map_err(|DecodeError(message)| DecodeError(format!("row {index}: {message}")))?;
                bars.push(raw);
            }
            Ok(KlinesPayload::Bars(bars))
        }
        Value::Object(fields) => {
            let code = fields.get("code").and_then(Value::as_i64);
            let message = fields.get("msg").and_then(Value::as_str);
            match (code, message) {
                (Some(code), _) if RATE_LIMIT_CODES.contains(&code) => {
                    Ok(KlinesPayload::RateLimited { code })
                }
                (Some(code), Some(message)) => Ok(KlinesPayload::ApiError {
                    code,
                    message: message.to_string(),
                }),
                // An error object missing its message (e.g. bare
                // {"code": -1}) carries no usable signal.
                _ => Err(DecodeError("error object without code/msg pair".to_string())),
            }
        }
        other => Err(DecodeError(format!(
            "expected a kline array or an error object, got {other}"
        ))),
    }
}

/// Parses one kline row, enforcing the OHLC price invariant.
pub fn parse_kline(row: &Value) -> Result<RawBar, DecodeError> {
    let fields = row
        .as_array()
        .ok_or_else(|| DecodeError("kline row is not an array".to_string()))?;
    if fields.len() < 7 {
        return Err(DecodeError(format!(
            "kline row has {} fields, expected at least 7",
            fields.len()
        )));
    }

    let open_time_ms = fields[0]
        .as_i64()
        .ok_or_else(|| DecodeError("open time is not an integer".to_string()))?;
    let close_time_ms = fields[6]
        .as_i64()
        .ok_or_else(|| DecodeError("close time is not an integer".to_string()))?;

    let open = numeric(&fields[1]).ok_or_else(|| DecodeError("open is not numeric".to_string()))?;
    let high = numeric(&fields[2]).ok_or_else(|| DecodeError("high is not numeric".to_string()))?;
    let low = numeric(&fields[3]).ok_or_else(|| DecodeError("low is not numeric".to_string()))?;
    let close =
        numeric(&fields[4]).ok_or_else(|| DecodeError("close is not numeric".to_string()))?;
    let volume =
        numeric(&fields[5]).ok_or_else(|| DecodeError("volume is not numeric".to_string()))?;

    if !(open > 0.0 && high > 0.0 && low > 0.0 && close > 0.0) {
        return Err(DecodeError("prices must be positive".to_string()));
    }
    if low > open.min(close) || open.max(close) > high {
        return Err(DecodeError(format!(
            "OHLC invariant violated: low={low} open={open} close={close} high={high}"
        )));
    }
    if volume < 0.0 {
        return Err(DecodeError("volume must be non-negative".to_string()));
    }

    let timestamp = millis_to_utc(open_time_ms)
        .ok_or_else(|| DecodeError(format!("open time {open_time_ms} is out of range")))?;

    let trade_count = fields.get(8).and_then(Value::as_u64);

    Ok(RawBar {
        bar: Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            trade_count,
        },
        close_time_ms,
    })
}

/// Accepts numeric fields as either JSON numbers or decimal strings,
/// both of which appear in the wild.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
