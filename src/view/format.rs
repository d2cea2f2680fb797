//! Number formatting shared by the table and chart views

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places shown for prices and deltas
pub const DISPLAY_PLACES: u32 = 4;

/// Decimal places compared by duplicate suppression
pub const DEDUP_PLACES: u32 = 2;

/// Round half away from zero; `None` when the value has no decimal form
///
/// Rounds the exact binary value, so `1.005` (stored as `1.00499…`) rounds
/// down to `1.00`.
pub fn round_to(value: f64, places: u32) -> Option<Decimal> {
    Decimal::from_f64_retain(value)
        .or_else(|| Decimal::from_f64(value))
        .map(|d| d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero))
}

/// Round to `places` and back to f64; non-finite input stays as is
pub fn round_f64(value: f64, places: u32) -> f64 {
    round_to(value, places)
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Fixed-point rendering with exactly `places` decimals
///
/// Zero never carries a sign. Values outside the decimal range print as
/// `NaN`, `Infinity` or `-Infinity`.
pub fn fixed(value: f64, places: u32) -> String {
    match round_to(value, places) {
        Some(mut d) => {
            d.rescale(places);
            if d.is_zero() {
                d.set_sign_positive(true);
            }
            d.to_string()
        }
        None => non_finite(value),
    }
}

/// Price rendering: at most four decimals, trailing zeros trimmed
///
/// `1.50000` → `1.5`, `2.00000` → `2`, `1.23456` → `1.2346`.
pub fn format_price(value: f64) -> String {
    match round_to(value, DISPLAY_PLACES) {
        Some(d) => {
            let mut d = d.normalize();
            if d.is_zero() {
                d.set_sign_positive(true);
            }
            d.to_string()
        }
        None => non_finite(value),
    }
}

fn non_finite(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        // finite but beyond Decimal's range
        value.to_string()
    }
}
