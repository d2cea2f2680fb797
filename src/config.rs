//! Configuration types for crypto-ticker

use serde::Deserialize;
use std::path::PathBuf;

/// Bundled default configuration
pub const DEFAULT_CONFIG: &str = include_str!("../config.toml.example");

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Price feed client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint serving `send_price_update` frames
    #[serde(default = "default_feed_url")]
    pub url: String,
}

fn default_feed_url() -> String {
    "ws://localhost:8000/ws/crypto/".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
        }
    }
}

/// Rolling history configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Maximum samples retained per symbol
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_max_samples() -> usize {
    50
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_samples: default_max_samples(),
        }
    }
}

/// Chart configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    /// Symbol charted at startup
    #[serde(default = "default_symbol")]
    pub initial_symbol: String,

    /// Symbol drawn with the primary palette; every other symbol uses the secondary one
    #[serde(default = "default_symbol")]
    pub primary_symbol: String,
}

fn default_symbol() -> String {
    "BTC/USDT".to_string()
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            initial_symbol: default_symbol(),
            primary_symbol: default_symbol(),
        }
    }
}

/// Upstream relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Address the relay listens on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Only upgrade requests on this path are accepted
    #[serde(default = "default_path")]
    pub path: String,

    /// Binance WebSocket base URL
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Streams requested with the SUBSCRIBE call
    #[serde(default = "default_streams")]
    pub streams: Vec<String>,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_path() -> String {
    "/ws/crypto/".to_string()
}
fn default_upstream_url() -> String {
    "wss://stream.binance.com:9443/ws".to_string()
}
fn default_streams() -> Vec<String> {
    vec!["btcusdt@trade".to_string(), "ethusdt@trade".to_string()]
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            path: default_path(),
            upstream_url: default_upstream_url(),
            streams: default_streams(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Configuration bundled with the binary
    pub fn bundled() -> anyhow::Result<Self> {
        Ok(toml::from_str(DEFAULT_CONFIG)?)
    }
}
