//! WebSocket fan-out server

use super::RelayError;
use crate::telemetry::{self, GaugeMetric};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;

/// Frames buffered per client before it starts skipping
const CLIENT_BUFFER: usize = 256;

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Serves relayed price frames to every connected WebSocket client
pub struct RelayServer {
    listener: TcpListener,
    path: String,
    frames: broadcast::Sender<String>,
    clients: Arc<AtomicUsize>,
}

impl RelayServer {
    /// Bind the listener; upgrades are only accepted on `path`
    pub async fn bind(addr: &str, path: impl Into<String>) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RelayError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        let (frames, _) = broadcast::channel(CLIENT_BUFFER);

        Ok(Self {
            listener,
            path: path.into(),
            frames,
            clients: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for publishing frames to all clients
    pub fn publisher(&self) -> broadcast::Sender<String> {
        self.frames.clone()
    }

    /// Accept clients until the task is dropped
    ///
    /// Accept errors (e.g. out of file descriptors) are logged and retried
    /// after [`ACCEPT_BACKOFF`].
    pub async fn run(self) {
        tracing::info!(addr = ?self.listener.local_addr().ok(), path = %self.path, "Relay listening");

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept relay client");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            // Subscribe before the handshake so no frame published after the
            // client sees the upgrade can be missed
            let frames = self.frames.subscribe();
            let path = self.path.clone();
            let clients = Arc::clone(&self.clients);

            tokio::spawn(async move {
                let connected = clients.fetch_add(1, Ordering::Relaxed) + 1;
                telemetry::set_gauge(GaugeMetric::RelayClients, connected as f64);

                if let Err(e) = serve_client(stream, peer, &path, frames).await {
                    tracing::warn!(%peer, error = %e, "Relay client ended with error");
                }

                let connected = clients.fetch_sub(1, Ordering::Relaxed) - 1;
                telemetry::set_gauge(GaugeMetric::RelayClients, connected as f64);
            });
        }
    }
}

async fn serve_client(
    stream: TcpStream,
    peer: SocketAddr,
    path: &str,
    mut frames: broadcast::Receiver<String>,
) -> Result<(), RelayError> {
    let check_path = |request: &Request, response: Response| {
        if request.uri().path() == path {
            Ok(response)
        } else {
            let mut error = ErrorResponse::new(Some("Not Found".to_string()));
            *error.status_mut() = StatusCode::NOT_FOUND;
            Err(error)
        }
    };

    let ws = tokio_tungstenite::accept_hdr_async(stream, check_path).await?;
    let (mut write, mut read) = ws.split();

    tracing::info!(%peer, "Relay client connected");

    loop {
        tokio::select! {
            frame = frames.recv() => {
                match frame {
                    Ok(text) => write.send(Message::Text(text)).await?,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%peer, skipped, "Relay client lagging, frames skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::info!(%peer, "Relay client disconnected");
    Ok(())
}
