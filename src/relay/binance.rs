//! Binance trade stream source

use crate::ws::{WsClient, WsConfig, WsMessage};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;

/// A trade normalised for the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    /// Pair as shown to clients, e.g. "BTC/USDT"
    pub symbol: String,
    pub price: Decimal,
}

/// Fields of a Binance trade event the relay cares about
#[derive(Debug, Deserialize)]
struct BinanceTradeMessage {
    /// Symbol
    #[serde(rename = "s")]
    symbol: String,
    /// Price
    #[serde(rename = "p")]
    price: String,
}

/// Subscribes to Binance trade streams and yields normalised trades
pub struct BinanceSource {
    url: String,
    streams: Vec<String>,
}

impl BinanceSource {
    pub fn new(url: impl Into<String>, streams: Vec<String>) -> Self {
        Self {
            url: url.into(),
            streams,
        }
    }

    /// SUBSCRIBE request sent after every (re)connect
    pub fn subscribe_message(&self) -> String {
        json!({
            "method": "SUBSCRIBE",
            "params": self.streams,
            "id": 1,
        })
        .to_string()
    }

    /// Parse a trade event
    ///
    /// Returns `None` for anything without both a symbol and a price
    /// (subscription acks and the like) and for prices that do not parse.
    fn parse_message(msg: &str) -> Option<Trade> {
        let trade: BinanceTradeMessage = serde_json::from_str(msg).ok()?;
        let symbol = normalize_symbol(&trade.symbol);

        match Decimal::from_str(&trade.price) {
            Ok(price) => Some(Trade { symbol, price }),
            Err(e) => {
                tracing::warn!(symbol = %symbol, price = %trade.price, error = %e, "Invalid trade price");
                None
            }
        }
    }

    /// Run the message processing loop
    async fn run_message_loop(
        mut ws_rx: mpsc::Receiver<WsMessage>,
        ws_tx: mpsc::Sender<String>,
        subscribe: String,
        trade_tx: mpsc::Sender<Trade>,
    ) {
        while let Some(msg) = ws_rx.recv().await {
            match msg {
                WsMessage::Text(text) => {
                    if let Some(trade) = Self::parse_message(&text) {
                        if trade_tx.send(trade).await.is_err() {
                            tracing::debug!("Trade receiver dropped, stopping source");
                            break;
                        }
                    }
                }
                WsMessage::Connected => {
                    tracing::info!("Binance stream connected, subscribing");
                    if ws_tx.send(subscribe.clone()).await.is_err() {
                        break;
                    }
                }
                WsMessage::Disconnected => {
                    tracing::warn!("Binance stream disconnected");
                    break;
                }
                WsMessage::Reconnecting { attempt } => {
                    tracing::warn!(attempt, "Binance stream reconnecting...");
                }
            }
        }
    }

    /// Connect and start streaming trades
    pub fn start(&self) -> mpsc::Receiver<Trade> {
        let (trade_tx, trade_rx) = mpsc::channel(1024);

        tracing::info!(url = %self.url, streams = ?self.streams, "Starting Binance source");

        let config = WsConfig::new(self.url.clone())
            .max_reconnects(0)
            .initial_delay(Duration::from_secs(5))
            .max_delay(Duration::from_secs(60))
            .ping_interval(Duration::from_secs(30));

        let (ws_rx, ws_tx) = WsClient::new(config).connect_bidirectional();
        let subscribe = self.subscribe_message();

        tokio::spawn(async move {
            Self::run_message_loop(ws_rx, ws_tx, subscribe, trade_tx).await;
        });

        trade_rx
    }
}

/// `BTCUSDT` → `BTC/USDT`
pub fn normalize_symbol(raw: &str) -> String {
    raw.replace("USDT", "/USDT")
}
