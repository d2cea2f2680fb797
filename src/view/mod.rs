//! View models
//!
//! Pure projections from history to what gets drawn: one [`RowView`] per
//! symbol and one [`ChartView`] for the selected symbol. Renderers only
//! consume these.

mod chart;
mod format;
mod table;

pub use chart::{elapsed_label, smooth, ChartStyle, ChartView, X_AXIS_TITLE, Y_AXIS_TITLE};
pub use format::{fixed, format_price, round_f64, round_to, DEDUP_PLACES, DISPLAY_PLACES};
pub use table::{percent_change, RowView, Trend};
