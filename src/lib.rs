//! crypto-ticker: Live cryptocurrency price ticker
//!
//! This library provides the core components for:
//! - WebSocket price feed with `send_price_update` frame decoding
//! - Bounded per-symbol price history
//! - Table rows with change and percent change
//! - Smoothed price chart with elapsed-time labels
//! - Ticker widget with click/hover selection and pluggable renderers
//! - Binance relay serving the feed protocol
//! - Logging and metrics

pub mod cli;
pub mod config;
pub mod feed;
pub mod history;
pub mod relay;
pub mod telemetry;
pub mod view;
pub mod widget;
pub mod ws;
