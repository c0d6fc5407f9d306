//! Standings Bot service
//!
//! Connects to the Discord gateway, schedules the weekly standings post once
//! the session is ready, and answers live standings commands until shut down.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use standings_bot::{
    config_path, graceful_shutdown, initialize_logging, load_config, setup_signal_handlers,
    telemetry, BotService, DiscordGateway,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "standings-bot")]
#[command(about = "Posts fantasy league standings to Discord")]
struct Args {
    /// Configuration file (defaults to $STANDINGS_CONFIG or config/standings.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Post every league's standings once and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let path = args.config.unwrap_or_else(config_path);
    let config = load_config(&path).context("Failed to load configuration")?;

    initialize_logging(&config.logging)?;
    info!("Starting Standings Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {:?}", path);

    telemetry::install_exporter(&config.metrics)?;

    let service = BotService::new(config).context("Failed to initialize service")?;
    let service = Arc::new(service);

    if args.once {
        let report = service.post_all_now().await;
        info!(
            posted = report.posted.len(),
            failed = report.failed.len(),
            "One-off standings post finished"
        );
        return Ok(());
    }

    let shutdown_signal = setup_signal_handlers()?;
    info!("Signal handlers configured");

    let gateway_handle = {
        let gateway = DiscordGateway::new(service.config.discord.clone(), service.clone());
        tokio::spawn(async move {
            if let Err(e) = gateway.run().await {
                error!("Gateway stopped: {}", e);
            }
        })
    };

    info!("Standings Bot is running. Press Ctrl+C to stop.");
    tokio::select! {
        _ = shutdown_signal => info!("Shutdown signal received. Initiating graceful shutdown..."),
        _ = wait_for_exit(&gateway_handle) => warn!("Gateway exited, shutting down"),
    }

    graceful_shutdown(service.scheduler.clone(), gateway_handle, SHUTDOWN_TIMEOUT).await;

    info!("Standings Bot shutdown complete");
    Ok(())
}

async fn wait_for_exit(handle: &tokio::task::JoinHandle<()>) {
    while !handle.is_finished() {
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}
