//! Watch command implementation

use super::{session_history, TickerOptions};
use crate::config::Config;
use crate::feed::{PriceFeed, SocketFeed};
use crate::widget::{LogRenderer, TickerWidget};
use clap::Args;

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub ticker: TickerOptions,
}

impl WatchArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        self.ticker.apply(&mut config);

        let mut widget =
            match TickerWidget::mount(LogRenderer::new(), session_history(&config), &config.chart)
            {
                Ok(widget) => widget,
                Err(e) => {
                    tracing::error!(error = %e, "Ticker disabled");
                    return Ok(());
                }
            };

        let feed = SocketFeed::new(config.feed.url.clone());
        let mut events = feed.subscribe().await?;

        tokio::select! {
            _ = widget.run(&mut events) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
            }
        }

        tracing::info!(
            rows = widget.renderer().rows_rendered(),
            charts = widget.renderer().charts_rendered(),
            "Watch finished"
        );
        Ok(())
    }
}
