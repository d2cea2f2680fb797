//! Chart series projection

use super::format::format_price;
use crate::history::Sample;
use serde::Serialize;

pub const X_AXIS_TITLE: &str = "Time";
pub const Y_AXIS_TITLE: &str = "Price";

/// Fixed visual encoding of a chart line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartStyle {
    /// Line color as RGB
    pub rgb: (u8, u8, u8),
    /// Opacity of the area under the line
    pub fill_alpha: f32,
    pub fill: bool,
    /// Bezier tension of the line
    pub tension: f32,
    pub animation_ms: u64,
    pub easing: &'static str,
}

impl ChartStyle {
    pub const PRIMARY: ChartStyle = ChartStyle {
        rgb: (75, 192, 192),
        fill_alpha: 0.2,
        fill: true,
        tension: 0.3,
        animation_ms: 800,
        easing: "easeOutQuad",
    };

    pub const SECONDARY: ChartStyle = ChartStyle {
        rgb: (255, 159, 64),
        ..ChartStyle::PRIMARY
    };

    /// Primary style for the primary symbol, secondary for everything else
    pub fn for_symbol(symbol: &str, primary_symbol: &str) -> Self {
        if symbol == primary_symbol {
            Self::PRIMARY
        } else {
            Self::SECONDARY
        }
    }

    pub fn border_css(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("rgba({}, {}, {}, 1)", r, g, b)
    }

    pub fn fill_css(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("rgba({}, {}, {}, {})", r, g, b, self.fill_alpha)
    }
}

/// A full chart: one smoothed line for the selected symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub symbol: String,
    /// `H:MM` since session start, one per point
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub style: ChartStyle,
}

impl ChartView {
    /// Build the chart for `symbol` from its retained samples, oldest first
    pub fn project<'a>(
        symbol: &str,
        samples: impl IntoIterator<Item = &'a Sample>,
        primary_symbol: &str,
    ) -> Self {
        let (labels, prices): (Vec<_>, Vec<_>) = samples
            .into_iter()
            .map(|s| (elapsed_label(s.elapsed_ms), s.price))
            .unzip();

        Self {
            symbol: symbol.to_string(),
            labels,
            values: smooth(&prices),
            style: ChartStyle::for_symbol(symbol, primary_symbol),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Y-axis tick text
    pub fn y_tick(value: f64) -> String {
        format_price(value)
    }

    /// Smallest and largest finite values, for axis bounds
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Three-point moving average of interior points
///
/// The first and last points are kept as is.
pub fn smooth(values: &[f64]) -> Vec<f64> {
    let last = values.len().saturating_sub(1);
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i == 0 || i == last {
                v
            } else {
                (values[i - 1] + v + values[i + 1]) / 3.0
            }
        })
        .collect()
}

/// `H:MM` for a millisecond offset; hours are not padded
pub fn elapsed_label(elapsed_ms: u64) -> String {
    let hours = elapsed_ms / 3_600_000;
    let minutes = (elapsed_ms % 3_600_000) / 60_000;
    format!("{}:{:02}", hours, minutes)
}
