use clap::Parser;
use crypto_ticker::cli::{Cli, Commands};
use crypto_ticker::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using bundled configuration");
        Config::bundled().unwrap_or_default()
    });

    // The dashboard owns the terminal; it only logs when a file is configured
    let console_owned = matches!(cli.command, Commands::Dashboard(_));
    if !console_owned || config.telemetry.log_file.is_some() {
        crypto_ticker::telemetry::init_telemetry(&config.telemetry)?;
    }

    match cli.command {
        Commands::Watch(args) => {
            tracing::info!(url = %config.feed.url, "Starting ticker");
            args.execute(config).await?;
        }
        Commands::Dashboard(args) => {
            tracing::info!(url = %config.feed.url, "Starting dashboard");
            args.execute(config).await?;
        }
        Commands::Relay(args) => {
            tracing::info!("Starting relay");
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {}", config.feed.url);
            println!("  History: {} samples per symbol", config.history.max_samples);
            println!(
                "  Chart: initial={} primary={}",
                config.chart.initial_symbol, config.chart.primary_symbol
            );
            println!(
                "  Relay: {}{} <- {} {:?}",
                config.relay.bind, config.relay.path, config.relay.upstream_url, config.relay.streams
            );
            println!(
                "  Telemetry: level={} format={:?}",
                config.telemetry.log_level, config.telemetry.log_format
            );
        }
    }

    Ok(())
}
