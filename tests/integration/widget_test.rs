//! Integration tests for the ticker widget through its public API

use crypto_ticker::config::ChartConfig;
use crypto_ticker::feed::{FeedEvent, PriceUpdate};
use crypto_ticker::history::{HistoryStore, ManualClock, DEFAULT_MAX_SAMPLES};
use crypto_ticker::view::{ChartStyle, ChartView, RowView, Trend};
use crypto_ticker::widget::{
    ConnectionState, Renderer, Surfaces, Target, TickerWidget, UiEvent, UpdateOutcome,
};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct Recorder {
    rows: Vec<RowView>,
    charts: Vec<ChartView>,
    states: Vec<ConnectionState>,
}

impl Renderer for Recorder {
    fn surfaces(&self) -> Surfaces {
        Surfaces::ALL
    }

    fn render_row(&mut self, row: &RowView) {
        self.rows.push(row.clone());
    }

    fn render_chart(&mut self, chart: &ChartView) {
        self.charts.push(chart.clone());
    }

    fn set_highlight(&mut self, _symbol: &str, _highlighted: bool) {}

    fn connection_changed(&mut self, state: ConnectionState) {
        self.states.push(state);
    }
}

fn widget(clock: &ManualClock) -> TickerWidget<Recorder> {
    TickerWidget::mount(
        Recorder::default(),
        HistoryStore::new(DEFAULT_MAX_SAMPLES, clock.clone()),
        &ChartConfig::default(),
    )
    .unwrap()
}

fn update(symbol: &str, price: f64) -> PriceUpdate {
    PriceUpdate::new(symbol, price, "2024-01-01 12:00:00")
}

#[test]
fn test_history_is_capped_fifo() {
    let clock = ManualClock::new();
    let mut widget = widget(&clock);

    for i in 0..60 {
        clock.advance(Duration::from_secs(1));
        let outcome = widget.apply_update(&update("BTC/USDT", 100.0 + i as f64));
        assert!(matches!(outcome, UpdateOutcome::Recorded(_)));
    }

    let prices: Vec<f64> = widget
        .history()
        .samples("BTC/USDT")
        .map(|s| s.price)
        .collect();
    assert_eq!(prices.len(), DEFAULT_MAX_SAMPLES);
    assert_eq!(prices[0], 110.0);
    assert_eq!(prices[DEFAULT_MAX_SAMPLES - 1], 159.0);

    let chart = widget.renderer().charts.last().unwrap();
    assert_eq!(chart.values.len(), DEFAULT_MAX_SAMPLES);
    assert_eq!(chart.labels.first().unwrap(), "0:00");
    assert_eq!(chart.labels.last().unwrap(), "0:01");
}

#[test]
fn test_two_decimal_duplicates_are_suppressed() {
    let clock = ManualClock::new();
    let mut widget = widget(&clock);

    widget.apply_update(&update("ETH/USDT", 2250.101));
    assert_eq!(
        widget.apply_update(&update("ETH/USDT", 2250.104)),
        UpdateOutcome::Suppressed
    );
    assert!(matches!(
        widget.apply_update(&update("ETH/USDT", 2250.11)),
        UpdateOutcome::Recorded(_)
    ));

    assert_eq!(widget.history().len("ETH/USDT"), 2);
    assert_eq!(widget.renderer().rows.len(), 2);
}

#[test]
fn test_row_shows_change_against_previous() {
    let clock = ManualClock::new();
    let mut widget = widget(&clock);

    widget.apply_update(&update("BTC/USDT", 100.0));
    widget.apply_update(&update("BTC/USDT", 95.0));

    let row = widget.renderer().rows.last().unwrap();
    assert_eq!(row.trend, Trend::Down);
    assert_eq!(row.change_cell(), "-5 (-5.00%)");
}

#[test]
fn test_selection_redraws_from_full_history() {
    let clock = ManualClock::new();
    let mut widget = widget(&clock);

    for price in [2000.0, 2003.0, 2009.0] {
        clock.advance(Duration::from_secs(30));
        widget.apply_update(&update("ETH/USDT", price));
    }
    // ETH is not selected yet
    assert!(widget.renderer().charts.is_empty());

    widget.handle_ui(UiEvent::Click(Target::SymbolLabel("ETH/USDT".into())));
    assert_eq!(widget.selected(), "ETH/USDT");

    let chart = widget.renderer().charts.last().unwrap();
    assert_eq!(chart.symbol, "ETH/USDT");
    assert_eq!(chart.values, vec![2000.0, 2004.0, 2009.0]);
    assert_eq!(chart.labels, vec!["0:00", "0:01", "0:01"]);
    assert_eq!(chart.style, ChartStyle::SECONDARY);
}

#[tokio::test]
async fn test_run_applies_events_until_closed() {
    let clock = ManualClock::new();
    let mut widget = widget(&clock);
    let (tx, mut rx) = mpsc::channel(8);

    tx.send(FeedEvent::Opened).await.unwrap();
    tx.send(FeedEvent::Update(update("BTC/USDT", 42000.0)))
        .await
        .unwrap();
    tx.send(FeedEvent::Closed).await.unwrap();
    tx.send(FeedEvent::Update(update("BTC/USDT", 43000.0)))
        .await
        .unwrap();

    widget.run(&mut rx).await;

    assert_eq!(widget.connection(), ConnectionState::Closed);
    assert_eq!(
        widget.renderer().states,
        vec![ConnectionState::Open, ConnectionState::Closed]
    );
    assert_eq!(widget.history().len("BTC/USDT"), 1);
    assert_eq!(widget.renderer().charts.len(), 1);
}
