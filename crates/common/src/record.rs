use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::PriceObservation;

/// Why a wire record was rejected. Always recoverable: the record is skipped.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unparseable date '{0}'")]
    Date(String),

    #[error("price must be finite and positive, got {0}")]
    Price(f64),
}

// ─── Wire format ─────────────────────────────────────────────────────────────

/// `{"date": "<ISO-8601>", "price": <number>, "symbol": "<optional>"}`
///
/// `price` must be a JSON number; strings are rejected rather than coerced.
#[derive(Deserialize)]
struct WireRecord {
    date: String,
    price: f64,
    #[serde(default)]
    symbol: Option<String>,
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse and validate one JSON record into a [`PriceObservation`].
///
/// Missing or blank `symbol` falls back to `default_symbol`.
pub fn parse_record(text: &str, default_symbol: &str) -> Result<PriceObservation, ParseError> {
    let wire: WireRecord = serde_json::from_str(text)?;

    if !wire.price.is_finite() || wire.price <= 0.0 {
        return Err(ParseError::Price(wire.price));
    }

    let timestamp = parse_timestamp(&wire.date)?;

    let symbol = wire
        .symbol
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default_symbol.to_string());

    Ok(PriceObservation::new(timestamp, wire.price, symbol))
}

/// RFC 3339 first; naive date-times and bare dates are read as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ParseError::Date(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_full_record() {
        let obs = parse_record(
            r#"{"date": "2024-03-01T12:30:00Z", "price": 101.5, "symbol": "ETH-USD"}"#,
            "BTC-USD",
        )
        .unwrap();
        assert_eq!(obs.symbol, "ETH-USD");
        assert_eq!(obs.price, 101.5);
        assert_eq!(obs.timestamp.hour(), 12);
        assert_eq!(obs.timestamp.minute(), 30);
    }

    #[test]
    fn missing_symbol_uses_default() {
        let obs = parse_record(r#"{"date": "2024-03-01T12:30:00", "price": 5}"#, "TEST").unwrap();
        assert_eq!(obs.symbol, "TEST");

        let obs = parse_record(
            r#"{"date": "2024-03-01 12:30:00.250", "price": 5, "symbol": "  "}"#,
            "TEST",
        )
        .unwrap();
        assert_eq!(obs.symbol, "TEST");
    }

    #[test]
    fn offset_timestamps_are_normalized_to_utc() {
        let obs = parse_record(r#"{"date": "2024-03-01T14:00:00+02:00", "price": 1.0}"#, "X")
            .unwrap();
        assert_eq!(obs.timestamp.hour(), 12);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let obs = parse_record(r#"{"date": "2024-03-01", "price": 1.0}"#, "X").unwrap();
        assert_eq!(obs.timestamp.hour(), 0);
    }

    #[test]
    fn rejects_missing_date() {
        let err = parse_record(r#"{"price": 100.0}"#, "X").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn rejects_bad_date() {
        let err = parse_record(r#"{"date": "yesterday", "price": 100.0}"#, "X").unwrap_err();
        assert!(matches!(err, ParseError::Date(_)));
    }

    #[test]
    fn rejects_string_price() {
        let err = parse_record(r#"{"date": "2024-03-01", "price": "100.0"}"#, "X").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn rejects_non_positive_price() {
        for price in ["0", "-3.5"] {
            let text = format!(r#"{{"date": "2024-03-01", "price": {price}}}"#);
            let err = parse_record(&text, "X").unwrap_err();
            assert!(matches!(err, ParseError::Price(_)), "{price} accepted");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_record("not json", "X").is_err());
        assert!(parse_record("", "X").is_err());
    }
}
