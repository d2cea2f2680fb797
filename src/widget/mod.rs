//! Ticker widget
//!
//! [`TickerWidget`] owns the history store and the selected symbol. It turns
//! feed events and pointer events into calls on a [`Renderer`]. Renderers are
//! thin adapters over the view models in [`crate::view`].

mod controller;
mod headless;
mod terminal;

pub use controller::{TickerWidget, UpdateOutcome};
pub use headless::LogRenderer;
pub use terminal::{HoverTracker, TerminalRenderer};

use crate::view::{ChartView, RowView};
use thiserror::Error;

/// Render regions a renderer can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surfaces {
    pub table: bool,
    pub chart: bool,
}

impl Surfaces {
    pub const ALL: Surfaces = Surfaces {
        table: true,
        chart: true,
    };
}

/// Lifecycle of the feed socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Open,
    #[default]
    Closed,
}

/// What a pointer event landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The symbol cell of a table row
    SymbolLabel(String),
    Other,
}

/// Pointer interaction with the rendered widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click(Target),
    Enter(Target),
    Leave(Target),
}

/// Widget errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WidgetError {
    /// The renderer cannot show a required region
    #[error("Missing render surface: {0}")]
    MissingSurface(&'static str),
}

/// Rendering side of the widget
pub trait Renderer {
    /// Regions available at mount time
    fn surfaces(&self) -> Surfaces;

    /// Create or replace the row keyed by `row.symbol`
    fn render_row(&mut self, row: &RowView);

    /// Discard the current chart and draw `chart` in its place
    fn render_chart(&mut self, chart: &ChartView);

    /// Toggle the hover style of a symbol label
    fn set_highlight(&mut self, symbol: &str, highlighted: bool);

    fn connection_changed(&mut self, _state: ConnectionState) {}
}
