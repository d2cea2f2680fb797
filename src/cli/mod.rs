//! CLI interface for crypto-ticker
//!
//! Provides subcommands for:
//! - `watch`: Follow the feed and log table/chart updates
//! - `dashboard`: Terminal table and chart
//! - `relay`: Serve Binance prices as `send_price_update` frames
//! - `config`: Show the effective configuration

mod dashboard;
mod relay;
mod watch;

pub use dashboard::DashboardArgs;
pub use relay::RelayArgs;
pub use watch::WatchArgs;

use crate::config::Config;
use crate::history::{HistoryStore, SessionClock};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "crypto-ticker")]
#[command(about = "Live crypto price ticker with a rolling chart")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the feed and log table/chart updates
    Watch(WatchArgs),
    /// Terminal table and chart
    Dashboard(DashboardArgs),
    /// Serve Binance prices to ticker clients
    Relay(RelayArgs),
    /// Show the effective configuration
    Config,
}

/// Options shared by the commands that run a ticker widget
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TickerOptions {
    /// Feed endpoint, overrides `[feed] url`
    #[arg(long)]
    pub url: Option<String>,

    /// Symbol to chart at startup, overrides `[chart] initial_symbol`
    #[arg(long)]
    pub symbol: Option<String>,
}

impl TickerOptions {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.feed.url = url.clone();
        }
        if let Some(symbol) = &self.symbol {
            config.chart.initial_symbol = symbol.clone();
        }
    }
}

/// History store for a fresh session
pub fn session_history(config: &Config) -> HistoryStore {
    HistoryStore::new(config.history.max_samples, SessionClock::start())
}
