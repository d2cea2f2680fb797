//! Headless renderer writing views to the log

use super::{ConnectionState, Renderer, Surfaces};
use crate::view::{ChartView, RowView, Trend};

/// Renders rows and charts as structured log events
#[derive(Debug, Default)]
pub struct LogRenderer {
    rows_rendered: u64,
    charts_rendered: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_rendered(&self) -> u64 {
        self.rows_rendered
    }

    pub fn charts_rendered(&self) -> u64 {
        self.charts_rendered
    }
}

impl Renderer for LogRenderer {
    fn surfaces(&self) -> Surfaces {
        Surfaces::ALL
    }

    fn render_row(&mut self, row: &RowView) {
        self.rows_rendered += 1;
        let arrow = match row.trend {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "=",
        };
        tracing::info!(
            symbol = %row.symbol,
            price = %row.price_text,
            change = %row.change_cell(),
            "{} {}",
            arrow,
            row.symbol
        );
    }

    fn render_chart(&mut self, chart: &ChartView) {
        self.charts_rendered += 1;
        let first = chart.values.first().copied().map(ChartView::y_tick);
        let last = chart.values.last().copied().map(ChartView::y_tick);
        tracing::info!(
            symbol = %chart.symbol,
            points = chart.values.len(),
            span = ?(chart.labels.first(), chart.labels.last()),
            first = ?first,
            last = ?last,
            color = %chart.style.border_css(),
            "Chart redrawn"
        );
    }

    fn set_highlight(&mut self, symbol: &str, highlighted: bool) {
        tracing::debug!(symbol, highlighted, "Symbol highlight");
    }

    fn connection_changed(&mut self, state: ConnectionState) {
        tracing::debug!(?state, "Connection state changed");
    }
}
