//! Relay command implementation

use crate::config::Config;
use crate::relay::{forward, BinanceSource, RelayServer};
use clap::Args;

#[derive(Args, Debug)]
pub struct RelayArgs {
    /// Listen address, overrides `[relay] bind`
    #[arg(long)]
    pub bind: Option<String>,

    /// Upgrade path, overrides `[relay] path`
    #[arg(long)]
    pub path: Option<String>,
}

impl RelayArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let mut relay = config.relay;
        if let Some(bind) = &self.bind {
            relay.bind = bind.clone();
        }
        if let Some(path) = &self.path {
            relay.path = path.clone();
        }

        let server = RelayServer::bind(&relay.bind, relay.path.clone()).await?;
        tracing::info!(addr = %server.local_addr()?, path = %relay.path, "Relay ready");

        let trades = BinanceSource::new(relay.upstream_url, relay.streams).start();
        tokio::spawn(forward(trades, server.publisher()));

        tokio::select! {
            _ = server.run() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Relay shutting down");
            }
        }

        Ok(())
    }
}
