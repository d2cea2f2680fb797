//! Price feed wire types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message type carrying a price update; every other type is ignored
pub const PRICE_UPDATE_TYPE: &str = "send_price_update";

/// Price as it appears on the wire: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WirePrice {
    Number(f64),
    Text(String),
}

impl WirePrice {
    /// Numeric value, NaN when the text has no numeric prefix
    pub fn value(&self) -> f64 {
        match self {
            WirePrice::Number(n) => *n,
            WirePrice::Text(s) => parse_float(s),
        }
    }
}

/// Parse the longest numeric prefix of `text`
///
/// `"42abc"` is 42 and trailing garbage is ignored. Only the literal
/// `Infinity` is infinite; `inf` and `nan` are NaN.
fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let is_digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while is_digit(end) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let mut frac = end + 1;
        while is_digit(frac) {
            frac += 1;
        }
        digits += frac - (end + 1);
        if digits > 0 {
            end = frac;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_start = exp;
        while is_digit(exp) {
            exp += 1;
        }
        if exp > exp_start {
            end = exp;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// A decoded `send_price_update` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Trading pair, e.g. "BTC/USDT"
    pub symbol: String,
    #[serde(default)]
    pub price: Option<WirePrice>,
    /// Server time, usually "%Y-%m-%d %H:%M:%S"
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl PriceUpdate {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price: Some(WirePrice::Number(price)),
            timestamp: Some(timestamp.into()),
        }
    }

    /// Price as f64; missing or non-numeric prices are NaN
    pub fn price(&self) -> f64 {
        self.price.as_ref().map_or(f64::NAN, WirePrice::value)
    }

    pub fn timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or_default()
    }
}

/// Events delivered by a [`PriceFeed`](super::PriceFeed), in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Socket opened
    Opened,
    /// A price update was decoded
    Update(PriceUpdate),
    /// Socket closed; no further events follow
    Closed,
}

/// Feed decoding errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Frame is not valid JSON, or a price update has the wrong shape
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode one text frame
///
/// Returns `Ok(None)` for well-formed messages of any type other than
/// `send_price_update`.
pub fn decode_frame(text: &str) -> Result<Option<PriceUpdate>, FeedError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    if value.get("type").and_then(serde_json::Value::as_str) != Some(PRICE_UPDATE_TYPE) {
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(value)?))
}
