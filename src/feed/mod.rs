//! Price feed module
//!
//! Receives `send_price_update` frames over a WebSocket and forwards them as
//! ordered [`FeedEvent`]s.

mod socket;
mod types;

pub use socket::SocketFeed;
pub use types::{decode_frame, FeedError, FeedEvent, PriceUpdate, WirePrice, PRICE_UPDATE_TYPE};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Trait for price feed implementations
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Subscribe to feed events
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<FeedEvent>>;
}
