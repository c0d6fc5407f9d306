//! Metrics counters and the optional Prometheus exporter

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use crate::config::MetricsConfig;
use crate::error::{BotError, Result};

pub const STANDINGS_POSTS: &str = "standings_posts_total";
pub const LIVE_COMMANDS: &str = "standings_live_commands_total";
pub const FETCH_FAILURES: &str = "standings_fetch_failures_total";

/// Install the Prometheus exporter when enabled
pub fn install_exporter(config: &MetricsConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| {
            BotError::Config(format!("Failed to install metrics exporter: {}", e))
        })?;

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

pub fn record_post(ok: bool) {
    metrics::increment_counter!(STANDINGS_POSTS, "outcome" => outcome(ok));
}

pub fn record_live_command(ok: bool) {
    metrics::increment_counter!(LIVE_COMMANDS, "outcome" => outcome(ok));
}

pub fn record_fetch_failure() {
    metrics::increment_counter!(FETCH_FAILURES);
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "failed"
    }
}
