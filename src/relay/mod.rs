//! Upstream relay
//!
//! Reads Binance trades, drops unchanged prices and broadcasts
//! `send_price_update` frames to WebSocket clients.

mod binance;
mod server;

pub use binance::{normalize_symbol, BinanceSource, Trade};
pub use server::RelayServer;

use crate::feed::PRICE_UPDATE_TYPE;
use crate::telemetry::{self, CounterMetric};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// Relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Outbound wire frame
#[derive(Debug, Serialize)]
struct PriceFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    symbol: &'a str,
    price: String,
    timestamp: String,
}

/// Encode a trade as a `send_price_update` frame
pub fn price_frame(trade: &Trade, at: DateTime<Utc>) -> String {
    let frame = PriceFrame {
        kind: PRICE_UPDATE_TYPE,
        symbol: &trade.symbol,
        price: trade.price.normalize().to_string(),
        timestamp: at.format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    // Serializing a struct of strings cannot fail
    serde_json::to_string(&frame).unwrap_or_default()
}

/// Last forwarded price per symbol
#[derive(Debug, Default)]
pub struct LastPrices {
    prices: HashMap<String, Decimal>,
}

impl LastPrices {
    /// Remember `trade` and report whether its price differs from the last one
    pub fn changed(&mut self, trade: &Trade) -> bool {
        match self.prices.insert(trade.symbol.clone(), trade.price) {
            Some(previous) => previous != trade.price,
            None => true,
        }
    }
}

/// Forward changed trades to the publisher until the source ends
pub async fn forward(mut trades: mpsc::Receiver<Trade>, publisher: broadcast::Sender<String>) {
    let mut last = LastPrices::default();

    while let Some(trade) = trades.recv().await {
        if !last.changed(&trade) {
            continue;
        }

        tracing::debug!(symbol = %trade.symbol, price = %trade.price, "Relaying price");
        let frame = price_frame(&trade, Utc::now());
        match publisher.send(frame) {
            Ok(receivers) => {
                telemetry::increment(CounterMetric::RelayFramesBroadcast);
                tracing::trace!(receivers, "Frame broadcast");
            }
            Err(_) => tracing::trace!("No relay clients connected"),
        }
    }

    tracing::warn!("Trade source ended");
}
