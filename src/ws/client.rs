//! WebSocket client with optional reconnection

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{sleep, Interval};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// How a connection ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    /// Server sent a close frame
    Remote,
    /// Our receiver or sender was dropped
    Local,
}

/// Reusable WebSocket client with reconnection and ping/pong handling
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect and return a receiver for messages
    ///
    /// This spawns a background task that owns the socket. Messages arrive on
    /// the returned channel in the order the server sent them, interleaved
    /// with connection status events (Connected, Disconnected, Reconnecting).
    pub fn connect(&self) -> mpsc::Receiver<WsMessage> {
        let (tx, rx) = mpsc::channel(1024);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, tx, None).await {
                tracing::error!(error = %e, "WebSocket connection loop failed");
            }
        });

        rx
    }

    /// Connect and return both a receiver and a sender for bidirectional communication
    ///
    /// Returns (message_receiver, message_sender)
    pub fn connect_bidirectional(&self) -> (mpsc::Receiver<WsMessage>, mpsc::Sender<String>) {
        let (msg_tx, msg_rx) = mpsc::channel(1024);
        let (send_tx, send_rx) = mpsc::channel(256);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, msg_tx, Some(send_rx)).await {
                tracing::error!(error = %e, "WebSocket bidirectional loop failed");
            }
        });

        (msg_rx, send_tx)
    }

    /// Run the connection loop, reconnecting with exponential backoff if enabled
    async fn run_connection_loop(
        config: WsConfig,
        tx: mpsc::Sender<WsMessage>,
        mut send_rx: Option<mpsc::Receiver<String>>,
    ) -> Result<(), WsError> {
        let mut reconnect_attempts = 0;
        let mut reconnect_delay = config.initial_reconnect_delay;

        loop {
            match Self::connect_and_stream(&config, &tx, send_rx.as_mut()).await {
                Ok(StreamEnd::Local) => {
                    tracing::info!("WebSocket closed locally");
                    let _ = tx.send(WsMessage::Disconnected).await;
                    break;
                }
                Ok(StreamEnd::Remote) if !config.reconnect => {
                    tracing::info!("WebSocket connection closed cleanly");
                    let _ = tx.send(WsMessage::Disconnected).await;
                    break;
                }
                Err(e) if !config.reconnect => {
                    tracing::warn!(error = %e, "WebSocket connection lost");
                    let _ = tx.send(WsMessage::Disconnected).await;
                    return Err(e);
                }
                Ok(StreamEnd::Remote) => {
                    tracing::info!("WebSocket closed by server, reconnecting...");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket connection error, reconnecting...");
                }
            }

            reconnect_attempts += 1;

            // Check max reconnects (0 = infinite)
            if config.max_reconnect_attempts > 0
                && reconnect_attempts >= config.max_reconnect_attempts
            {
                tracing::error!("Max reconnection attempts reached");
                let _ = tx.send(WsMessage::Disconnected).await;
                return Err(WsError::MaxReconnectsExceeded);
            }

            if tx.is_closed() {
                tracing::info!("Receiver dropped, stopping reconnection");
                break;
            }

            tracing::debug!(attempt = reconnect_attempts, delay = ?reconnect_delay, "Waiting to reconnect");
            let _ = tx
                .send(WsMessage::Reconnecting {
                    attempt: reconnect_attempts,
                })
                .await;

            sleep(reconnect_delay).await;
            reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay);
        }

        Ok(())
    }

    /// Connect to WebSocket and stream messages
    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsMessage>,
        mut send_rx: Option<&mut mpsc::Receiver<String>>,
    ) -> Result<StreamEnd, WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(config.url.as_str())
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        tracing::info!(url = %config.url, "WebSocket connected");

        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok(StreamEnd::Local);
        }

        let mut ping_interval = config.ping_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval
        });
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                return Ok(StreamEnd::Local);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            return Ok(StreamEnd::Remote);
                        }
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                        _ => {}
                    }
                }

                msg = async {
                    match &mut send_rx {
                        Some(rx) => rx.recv().await,
                        None => std::future::pending().await,
                    }
                } => {
                    match msg {
                        Some(text) => {
                            write.send(Message::Text(text)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        None => {
                            // Sender dropped, close connection
                            return Ok(StreamEnd::Local);
                        }
                    }
                }

                _ = next_tick(&mut ping_interval) => {
                    if waiting_for_pong {
                        return Err(WsError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
