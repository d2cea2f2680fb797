//! Integration tests for the socket price feed

use crypto_ticker::feed::{FeedEvent, PriceFeed, PriceUpdate, SocketFeed};
use futures_util::SinkExt;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Serve one client: send `frames` in order, then close
async fn serve_frames(frames: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }
        let _ = ws.close(None).await;
    });

    format!("ws://{}/ws/crypto/", addr)
}

async fn collect(feed: &SocketFeed) -> Vec<FeedEvent> {
    let mut events = feed.subscribe().await.unwrap();
    let mut collected = Vec::new();

    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(5), events.recv()).await {
        let closed = event == FeedEvent::Closed;
        collected.push(event);
        if closed {
            break;
        }
    }
    collected
}

#[tokio::test]
async fn test_socket_feed_delivers_in_order() {
    let url = serve_frames(vec![
        r#"{"type":"send_price_update","symbol":"BTC/USDT","price":"42000.5","timestamp":"2024-01-01 12:00:00"}"#,
        r#"{"type":"heartbeat"}"#,
        "not json",
        r#"{"type":"send_price_update","symbol":"ETH/USDT","price":2250.1,"timestamp":"2024-01-01 12:00:01"}"#,
        r#"{"type":"send_price_update","symbol":"BTC/USDT","price":"42001","timestamp":"2024-01-01 12:00:02"}"#,
    ])
    .await;

    let events = collect(&SocketFeed::new(url)).await;

    assert_eq!(events.len(), 5);
    assert_eq!(events[0], FeedEvent::Opened);

    let FeedEvent::Update(first) = &events[1] else {
        panic!("expected update, got {:?}", events[1]);
    };
    assert_eq!(first.symbol, "BTC/USDT");
    assert_eq!(first.price(), 42000.5);

    assert_eq!(
        events[2],
        FeedEvent::Update(PriceUpdate::new("ETH/USDT", 2250.1, "2024-01-01 12:00:01"))
    );

    let FeedEvent::Update(third) = &events[3] else {
        panic!("expected update, got {:?}", events[3]);
    };
    assert_eq!(third.price(), 42001.0);
    assert_eq!(events[4], FeedEvent::Closed);
}

#[tokio::test]
async fn test_socket_feed_unreachable_closes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let events = collect(&SocketFeed::new(format!("ws://{}/ws/crypto/", addr))).await;
    assert_eq!(events, vec![FeedEvent::Closed]);
}
