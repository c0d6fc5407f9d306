//! Signal handling for graceful shutdown

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::scheduler::WeeklyScheduler;

/// Resolve the returned receiver on Ctrl+C or SIGTERM
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let sigterm = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&sigterm))?;

    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C signal received"),
                Err(e) => error!("Failed to listen for Ctrl+C signal: {}", e),
            },
            _ = wait_for_flag(sigterm) => info!("SIGTERM signal received"),
        }
        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}

async fn wait_for_flag(flag: Arc<AtomicBool>) {
    while !flag.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Stop the scheduler and the gateway, waiting at most `shutdown_timeout`
pub async fn graceful_shutdown(
    scheduler: Arc<WeeklyScheduler>,
    gateway_handle: JoinHandle<()>,
    shutdown_timeout: Duration,
) {
    info!("Starting graceful shutdown...");

    scheduler.shutdown();

    gateway_handle.abort();
    match timeout(shutdown_timeout, gateway_handle).await {
        Ok(Ok(())) => info!("Gateway stopped gracefully"),
        Ok(Err(e)) if e.is_cancelled() => info!("Gateway stopped"),
        Ok(Err(e)) => error!("Gateway task failed: {}", e),
        Err(_) => warn!("Gateway did not stop within timeout, forcing shutdown"),
    }

    info!("Graceful shutdown complete");
}
