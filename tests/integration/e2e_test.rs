//! End-to-end tests: relay server to socket feed to widget

use chrono::{TimeZone, Utc};
use crypto_ticker::config::Config;
use crypto_ticker::feed::{FeedEvent, PriceFeed, SocketFeed};
use crypto_ticker::history::{HistoryStore, SessionClock};
use crypto_ticker::relay::{price_frame, RelayServer, Trade};
use crypto_ticker::widget::{LogRenderer, TickerWidget};
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::sync::mpsc;

const PATH: &str = "/ws/crypto/";

async fn start_relay() -> (String, tokio::sync::broadcast::Sender<String>) {
    let server = RelayServer::bind("127.0.0.1:0", PATH).await.unwrap();
    let addr = server.local_addr().unwrap();
    let publisher = server.publisher();
    tokio::spawn(server.run());
    (format!("ws://{}", addr), publisher)
}

async fn next_event(events: &mut mpsc::Receiver<FeedEvent>) -> Option<FeedEvent> {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .ok()
        .flatten()
}

#[tokio::test]
async fn test_relay_frames_reach_widget() {
    let (base, publisher) = start_relay().await;
    let feed = SocketFeed::new(format!("{}{}", base, PATH));
    let mut events = feed.subscribe().await.unwrap();

    let config = Config::default();
    let mut widget = TickerWidget::mount(
        LogRenderer::new(),
        HistoryStore::new(config.history.max_samples, SessionClock::start()),
        &config.chart,
    )
    .unwrap();

    let opened = next_event(&mut events).await.unwrap();
    assert_eq!(opened, FeedEvent::Opened);
    widget.handle_event(opened);

    let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    for (symbol, price) in [
        ("BTC/USDT", dec!(42000.50)),
        ("ETH/USDT", dec!(2250.1)),
        ("BTC/USDT", dec!(42010)),
    ] {
        let trade = Trade {
            symbol: symbol.to_string(),
            price,
        };
        publisher.send(price_frame(&trade, at)).unwrap();
    }

    for _ in 0..3 {
        let event = next_event(&mut events).await.unwrap();
        assert!(matches!(event, FeedEvent::Update(_)));
        widget.handle_event(event);
    }

    let history = widget.history();
    assert_eq!(history.symbols(), ["BTC/USDT", "ETH/USDT"]);
    assert_eq!(history.last_price("BTC/USDT"), Some(42010.0));
    assert_eq!(history.previous("BTC/USDT").unwrap().price, 42000.5);
    assert_eq!(history.last_price("ETH/USDT"), Some(2250.1));

    assert_eq!(widget.renderer().rows_rendered(), 3);
    // Only BTC/USDT, the selected symbol, redraws the chart
    assert_eq!(widget.renderer().charts_rendered(), 2);
}

#[tokio::test]
async fn test_relay_rejects_unknown_path() {
    let (base, _publisher) = start_relay().await;
    let feed = SocketFeed::new(format!("{}/elsewhere/", base));
    let mut events = feed.subscribe().await.unwrap();

    assert_eq!(next_event(&mut events).await, Some(FeedEvent::Closed));
    assert_eq!(next_event(&mut events).await, None);
}

#[test]
fn test_bundled_config_matches_defaults() {
    let bundled = Config::bundled().unwrap();
    let defaults = Config::default();

    assert_eq!(bundled.feed.url, defaults.feed.url);
    assert_eq!(bundled.history.max_samples, 50);
    assert_eq!(bundled.chart.primary_symbol, "BTC/USDT");
    assert_eq!(bundled.relay.path, PATH);
}
