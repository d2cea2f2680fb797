//! Widget controller

use super::{ConnectionState, Renderer, Target, UiEvent, WidgetError};
use crate::config::ChartConfig;
use crate::feed::{FeedEvent, PriceUpdate};
use crate::history::{HistoryStore, Sample};
use crate::telemetry::{self, CounterMetric};
use crate::view::{fixed, ChartView, RowView, DEDUP_PLACES};
use tokio::sync::mpsc;

/// Result of applying one price update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Sample appended and views refreshed
    Recorded(Sample),
    /// Same price as the last sample at two decimals; nothing changed
    Suppressed,
}

/// Live ticker: history, selection and the renderer they feed
///
/// All handlers take `&mut self` and run to completion, so events are applied
/// strictly in the order they are handed in.
pub struct TickerWidget<R: Renderer> {
    history: HistoryStore,
    selected: String,
    primary_symbol: String,
    connection: ConnectionState,
    renderer: R,
}

impl<R: Renderer> TickerWidget<R> {
    /// Attach to a renderer
    ///
    /// Fails when the renderer lacks the table or the chart surface; the
    /// caller is expected to log and run nothing in that case.
    pub fn mount(
        renderer: R,
        history: HistoryStore,
        chart: &ChartConfig,
    ) -> Result<Self, WidgetError> {
        let surfaces = renderer.surfaces();
        if !surfaces.table {
            return Err(WidgetError::MissingSurface("table"));
        }
        if !surfaces.chart {
            return Err(WidgetError::MissingSurface("chart"));
        }

        Ok(Self {
            history,
            selected: chart.initial_symbol.clone(),
            primary_symbol: chart.primary_symbol.clone(),
            connection: ConnectionState::Closed,
            renderer,
        })
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Apply one feed event
    pub fn handle_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Opened => self.set_connection(ConnectionState::Open),
            FeedEvent::Closed => self.set_connection(ConnectionState::Closed),
            FeedEvent::Update(update) => {
                self.apply_update(&update);
            }
        }
    }

    /// Apply feed events in arrival order until the feed closes
    pub async fn run(&mut self, events: &mut mpsc::Receiver<FeedEvent>) {
        while let Some(event) = events.recv().await {
            let closed = event == FeedEvent::Closed;
            self.handle_event(event);
            if closed {
                break;
            }
        }
    }

    /// Record a price update and refresh the affected views
    ///
    /// The row is always redrawn; the chart only when the update is for the
    /// selected symbol.
    pub fn apply_update(&mut self, update: &PriceUpdate) -> UpdateOutcome {
        let symbol = update.symbol.as_str();
        let price = update.price();

        if self.is_duplicate(symbol, price) {
            telemetry::increment(CounterMetric::UpdatesSuppressed);
            tracing::debug!(symbol, price, "Price unchanged, skipping update");
            return UpdateOutcome::Suppressed;
        }

        let sample = self.history.record(symbol, price, update.timestamp());
        telemetry::increment(CounterMetric::SamplesRecorded);
        tracing::debug!(symbol, price, elapsed_ms = sample.elapsed_ms, "Recorded sample");

        let previous = self.history.previous(symbol).map(|s| s.price);
        self.renderer
            .render_row(&RowView::project(symbol, price, previous));

        if symbol == self.selected {
            self.refresh_chart();
        }

        UpdateOutcome::Recorded(sample)
    }

    /// Apply a pointer event
    pub fn handle_ui(&mut self, event: UiEvent) {
        match event {
            UiEvent::Click(Target::SymbolLabel(symbol)) => self.select(symbol),
            UiEvent::Enter(Target::SymbolLabel(symbol)) => {
                self.renderer.set_highlight(&symbol, true)
            }
            UiEvent::Leave(Target::SymbolLabel(symbol)) => {
                self.renderer.set_highlight(&symbol, false)
            }
            UiEvent::Click(Target::Other)
            | UiEvent::Enter(Target::Other)
            | UiEvent::Leave(Target::Other) => {}
        }
    }

    /// Chart `symbol` from now on and redraw immediately
    pub fn select(&mut self, symbol: impl Into<String>) {
        self.selected = symbol.into();
        tracing::info!(symbol = %self.selected, "Selected symbol");
        self.refresh_chart();
    }

    /// Redraw the chart of the selected symbol from its full history
    pub fn refresh_chart(&mut self) {
        let chart = ChartView::project(
            &self.selected,
            self.history.samples(&self.selected),
            &self.primary_symbol,
        );
        self.renderer.render_chart(&chart);
    }

    fn is_duplicate(&self, symbol: &str, price: f64) -> bool {
        self.history
            .last_price(symbol)
            .is_some_and(|last| fixed(last, DEDUP_PLACES) == fixed(price, DEDUP_PLACES))
    }

    fn set_connection(&mut self, state: ConnectionState) {
        match state {
            ConnectionState::Open => tracing::info!("Feed connection open"),
            ConnectionState::Closed => tracing::warn!("Feed connection closed"),
        }
        self.connection = state;
        self.renderer.connection_changed(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{ManualClock, DEFAULT_MAX_SAMPLES};
    use crate::view::Trend;
    use crate::widget::Surfaces;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        surfaces: Option<Surfaces>,
        rows: Vec<RowView>,
        charts: Vec<ChartView>,
        highlights: Vec<(String, bool)>,
        states: Vec<ConnectionState>,
    }

    impl Renderer for Recorder {
        fn surfaces(&self) -> Surfaces {
            self.surfaces.unwrap_or(Surfaces::ALL)
        }
        fn render_row(&mut self, row: &RowView) {
            self.rows.push(row.clone());
        }
        fn render_chart(&mut self, chart: &ChartView) {
            self.charts.push(chart.clone());
        }
        fn set_highlight(&mut self, symbol: &str, highlighted: bool) {
            self.highlights.push((symbol.to_string(), highlighted));
        }
        fn connection_changed(&mut self, state: ConnectionState) {
            self.states.push(state);
        }
    }

    fn widget() -> (TickerWidget<Recorder>, ManualClock) {
        let clock = ManualClock::new();
        let history = HistoryStore::new(DEFAULT_MAX_SAMPLES, clock.clone());
        let widget =
            TickerWidget::mount(Recorder::default(), history, &ChartConfig::default()).unwrap();
        (widget, clock)
    }

    fn update(symbol: &str, price: f64) -> PriceUpdate {
        PriceUpdate::new(symbol, price, "2024-01-01 12:00:00")
    }

    #[test]
    fn test_mount_requires_surfaces() {
        let history = HistoryStore::new(DEFAULT_MAX_SAMPLES, ManualClock::new());
        let renderer = Recorder {
            surfaces: Some(Surfaces {
                table: true,
                chart: false,
            }),
            ..Default::default()
        };
        let err = TickerWidget::mount(renderer, history, &ChartConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, WidgetError::MissingSurface("chart"));

        let history = HistoryStore::new(DEFAULT_MAX_SAMPLES, ManualClock::new());
        let renderer = Recorder {
            surfaces: Some(Surfaces {
                table: false,
                chart: true,
            }),
            ..Default::default()
        };
        assert!(TickerWidget::mount(renderer, history, &ChartConfig::default()).is_err());
    }

    #[test]
    fn test_initial_selection_from_config() {
        let (widget, _) = widget();
        assert_eq!(widget.selected(), "BTC/USDT");
        assert_eq!(widget.connection(), ConnectionState::Closed);
    }

    #[test]
    fn test_first_update_renders_flat_row_and_chart() {
        let (mut widget, _) = widget();
        let outcome = widget.apply_update(&update("BTC/USDT", 100.0));
        assert!(matches!(outcome, UpdateOutcome::Recorded(_)));

        let renderer = widget.renderer();
        assert_eq!(renderer.rows.len(), 1);
        assert_eq!(renderer.rows[0].trend, Trend::Flat);
        assert_eq!(renderer.rows[0].change, 0.0);
        assert_eq!(renderer.charts.len(), 1);
        assert_eq!(renderer.charts[0].values, vec![100.0]);
    }

    #[test]
    fn test_duplicate_suppressed() {
        let (mut widget, _) = widget();
        widget.apply_update(&update("BTC/USDT", 100.001));
        let outcome = widget.apply_update(&update("BTC/USDT", 100.004));

        assert_eq!(outcome, UpdateOutcome::Suppressed);
        assert_eq!(widget.history().len("BTC/USDT"), 1);
        assert_eq!(widget.renderer().rows.len(), 1);
        assert_eq!(widget.renderer().charts.len(), 1);
    }

    #[test]
    fn test_duplicate_at_binary_midpoint_suppressed() {
        let (mut widget, _) = widget();
        widget.apply_update(&update("BTC/USDT", 1.0));

        // 1.005 is 1.00499… in binary and renders as "1.00"
        assert_eq!(
            widget.apply_update(&update("BTC/USDT", 1.005)),
            UpdateOutcome::Suppressed
        );
        assert_eq!(widget.history().len("BTC/USDT"), 1);
    }

    #[test]
    fn test_change_at_two_decimals_recorded() {
        let (mut widget, _) = widget();
        widget.apply_update(&update("BTC/USDT", 100.0));
        widget.apply_update(&update("BTC/USDT", 110.0));

        let row = widget.renderer().rows.last().unwrap();
        assert_eq!(row.change, 10.0);
        assert_eq!(row.percent_text, "+10.00");
        assert_eq!(row.trend, Trend::Up);
        assert_eq!(widget.history().len("BTC/USDT"), 2);
    }

    #[test]
    fn test_nan_prices_suppress_each_other() {
        let (mut widget, _) = widget();
        let mut bad = update("BTC/USDT", 0.0);
        bad.price = Some(crate::feed::WirePrice::Text("oops".into()));

        assert!(matches!(widget.apply_update(&bad), UpdateOutcome::Recorded(_)));
        assert_eq!(widget.apply_update(&bad), UpdateOutcome::Suppressed);
        assert_eq!(widget.renderer().rows[0].price_text, "NaN");
    }

    #[test]
    fn test_unselected_symbol_skips_chart() {
        let (mut widget, _) = widget();
        widget.apply_update(&update("ETH/USDT", 2000.0));

        assert_eq!(widget.renderer().rows.len(), 1);
        assert!(widget.renderer().charts.is_empty());
        assert_eq!(widget.history().len("ETH/USDT"), 1);
    }

    #[test]
    fn test_click_selects_and_redraws() {
        let (mut widget, clock) = widget();
        widget.apply_update(&update("BTC/USDT", 100.0));
        clock.advance(Duration::from_secs(60));
        widget.apply_update(&update("ETH/USDT", 2000.0));
        clock.advance(Duration::from_secs(60));
        widget.apply_update(&update("ETH/USDT", 2010.0));

        let charts_before = widget.renderer().charts.len();
        widget.handle_ui(UiEvent::Click(Target::SymbolLabel("ETH/USDT".into())));

        assert_eq!(widget.selected(), "ETH/USDT");
        let charts = &widget.renderer().charts;
        assert_eq!(charts.len(), charts_before + 1);
        let chart = charts.last().unwrap();
        assert_eq!(chart.symbol, "ETH/USDT");
        assert_eq!(chart.values, vec![2000.0, 2010.0]);
        assert_eq!(chart.labels, vec!["0:01", "0:02"]);
        assert_eq!(chart.style, crate::view::ChartStyle::SECONDARY);

        assert_eq!(widget.history().len("BTC/USDT"), 1);
    }

    #[test]
    fn test_click_elsewhere_ignored() {
        let (mut widget, _) = widget();
        widget.handle_ui(UiEvent::Click(Target::Other));
        assert_eq!(widget.selected(), "BTC/USDT");
        assert!(widget.renderer().charts.is_empty());
    }

    #[test]
    fn test_hover_toggles_highlight() {
        let (mut widget, _) = widget();
        widget.handle_ui(UiEvent::Enter(Target::SymbolLabel("BTC/USDT".into())));
        widget.handle_ui(UiEvent::Leave(Target::SymbolLabel("BTC/USDT".into())));
        widget.handle_ui(UiEvent::Enter(Target::Other));

        assert_eq!(
            widget.renderer().highlights,
            vec![
                ("BTC/USDT".to_string(), true),
                ("BTC/USDT".to_string(), false)
            ]
        );
    }

    #[test]
    fn test_connection_lifecycle() {
        let (mut widget, _) = widget();
        widget.handle_event(FeedEvent::Opened);
        assert_eq!(widget.connection(), ConnectionState::Open);
        widget.handle_event(FeedEvent::Update(update("BTC/USDT", 1.0)));
        widget.handle_event(FeedEvent::Closed);
        assert_eq!(widget.connection(), ConnectionState::Closed);
        assert_eq!(
            widget.renderer().states,
            vec![ConnectionState::Open, ConnectionState::Closed]
        );
        assert_eq!(widget.history().len("BTC/USDT"), 1);
    }

    #[test]
    fn test_run_waits_for_close() {
        let (mut widget, _) = widget();
        let (tx, mut rx) = mpsc::channel(4);

        {
            let mut run = tokio_test::task::spawn(widget.run(&mut rx));
            tokio_test::assert_pending!(run.poll());

            tx.try_send(FeedEvent::Opened).unwrap();
            tx.try_send(FeedEvent::Update(update("BTC/USDT", 1.0)))
                .unwrap();
            tokio_test::assert_pending!(run.poll());

            tx.try_send(FeedEvent::Closed).unwrap();
            tokio_test::assert_ready!(run.poll());
        }

        assert_eq!(widget.connection(), ConnectionState::Closed);
        assert_eq!(widget.history().len("BTC/USDT"), 1);
    }
}
