//! Socket feed: one WebSocket connection, no reconnect

use super::types::{decode_frame, FeedEvent};
use super::PriceFeed;
use crate::telemetry::{self, CounterMetric};
use crate::ws::{WsClient, WsConfig, WsMessage};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Feed client reading `send_price_update` frames from a WebSocket endpoint
pub struct SocketFeed {
    url: String,
}

impl SocketFeed {
    /// Create a feed for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Turn raw socket messages into feed events
    ///
    /// Frames that fail to decode are logged and discarded. The loop ends on
    /// disconnect, after forwarding [`FeedEvent::Closed`].
    async fn run_message_loop(
        mut ws_rx: mpsc::Receiver<WsMessage>,
        event_tx: mpsc::Sender<FeedEvent>,
    ) {
        while let Some(msg) = ws_rx.recv().await {
            let event = match msg {
                WsMessage::Text(text) => {
                    telemetry::increment(CounterMetric::FramesReceived);
                    match decode_frame(&text) {
                        Ok(Some(update)) => FeedEvent::Update(update),
                        Ok(None) => {
                            tracing::debug!(frame = %text, "Ignoring non price-update frame");
                            continue;
                        }
                        Err(e) => {
                            telemetry::increment(CounterMetric::FramesMalformed);
                            tracing::error!(error = %e, frame = %text, "Failed to process feed message");
                            continue;
                        }
                    }
                }
                WsMessage::Connected => {
                    tracing::info!("Price feed connection established");
                    FeedEvent::Opened
                }
                WsMessage::Disconnected => {
                    tracing::warn!("Price feed connection closed");
                    let _ = event_tx.send(FeedEvent::Closed).await;
                    break;
                }
                WsMessage::Reconnecting { attempt } => {
                    // Only reachable if the client was built with reconnects enabled
                    tracing::warn!(attempt, "Price feed reconnecting...");
                    continue;
                }
            };

            if event_tx.send(event).await.is_err() {
                tracing::debug!("Feed receiver dropped, stopping feed");
                break;
            }
        }
    }
}

#[async_trait]
impl PriceFeed for SocketFeed {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<FeedEvent>> {
        let (event_tx, event_rx) = mpsc::channel(1024);

        tracing::info!(url = %self.url, "Subscribing to price feed");

        let client = WsClient::new(WsConfig::single_shot(self.url.clone()));
        let ws_rx = client.connect();

        tokio::spawn(async move {
            Self::run_message_loop(ws_rx, event_tx).await;
        });

        Ok(event_rx)
    }
}
