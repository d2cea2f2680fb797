//! Table row projection

use super::format::{fixed, format_price, round_f64, round_to, DISPLAY_PLACES};
use rust_decimal::Decimal;
use serde::Serialize;

/// Direction of the last price move, drives the row styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Everything needed to draw one table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    /// Row key, also the text of the symbol label cell
    pub symbol: String,
    pub price: f64,
    pub price_text: String,
    /// Price change rounded to four places
    pub change: f64,
    pub change_text: String,
    /// Percentage change with two decimals and a leading `+` when positive
    pub percent_text: String,
    pub trend: Trend,
}

impl RowView {
    /// Project the latest price of `symbol` against the previous retained one
    ///
    /// With no previous sample the current price is its own reference, so the
    /// first row for a symbol always shows a zero change.
    pub fn project(symbol: &str, current: f64, previous: Option<f64>) -> Self {
        let previous = previous.unwrap_or(current);
        let change = round_f64(current - previous, DISPLAY_PLACES);

        let trend = if change > 0.0 {
            Trend::Up
        } else if change < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        };

        Self {
            symbol: symbol.to_string(),
            price: current,
            price_text: format_price(current),
            change,
            change_text: format_price(change),
            percent_text: percent_change(change, previous),
            trend,
        }
    }

    /// Text of the change cell, e.g. `10 (+10.00%)`
    pub fn change_cell(&self) -> String {
        format!("{} ({}%)", self.change_text, self.percent_text)
    }
}

/// `change / previous × 100` with two decimals
///
/// Shows `0.00` when the previous price is zero or the result is not a number.
pub fn percent_change(change: f64, previous: f64) -> String {
    if previous == 0.0 || change.is_nan() {
        return "0.00".to_string();
    }

    let pct = change / previous * 100.0;
    match round_to(pct, 2) {
        Some(rounded) if rounded > Decimal::ZERO => format!("+{}", fixed(pct, 2)),
        Some(_) => fixed(pct, 2),
        None => "0.00".to_string(),
    }
}
