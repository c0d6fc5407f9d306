//! Bot configuration management
//!
//! Configuration is read from a TOML file, then overridden by environment
//! variables (a `.env` file is honoured), then validated.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sleeper_fetcher::SleeperConfig;

use crate::error::{BotError, Result};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/standings.toml";

/// Main bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Discord connection settings
    pub discord: DiscordConfig,

    /// Sleeper API settings
    pub sleeper: SleeperConfig,

    /// Weekly posting schedule
    pub schedule: ScheduleConfig,

    /// Standings table output
    pub render: RenderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,

    /// Leagues to report, in posting order
    pub leagues: Vec<LeagueConfig>,
}

/// One Sleeper league and the channel its standings go to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub league_id: String,
    pub channel_id: String,
}

/// Discord settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token, normally supplied through `DISCORD_TOKEN`
    #[serde(skip_serializing)]
    pub token: String,

    /// REST API root
    pub api_base_url: String,

    /// Gateway websocket URL
    pub gateway_url: String,

    /// Initial delay before reconnecting a dropped gateway session
    pub reconnect_delay_secs: u64,

    /// Upper bound for the reconnect delay
    pub max_reconnect_delay_secs: u64,
}

/// Weekly schedule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Enable the weekly post
    pub enabled: bool,

    /// Day of week (e.g. "Tue")
    pub weekday: String,

    /// Local time of day (HH:MM)
    pub time: String,

    /// IANA timezone of the local time (e.g. "America/Chicago")
    pub timezone: String,

    /// Retry policy for each league's post
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts
    pub max_retries: u32,

    /// Initial retry delay in seconds
    pub initial_delay_secs: u64,

    /// Maximum retry delay in seconds
    pub max_delay_secs: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

/// Table rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Attachment format (png, text)
    pub format: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Expose a Prometheus endpoint
    pub enabled: bool,

    /// Metrics export port
    pub port: u16,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base_url: "https://discord.com/api/v10".to_string(),
            gateway_url: "wss://gateway.discord.gg/?v=10&encoding=json".to_string(),
            reconnect_delay_secs: 5,
            max_reconnect_delay_secs: 300,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weekday: "Tue".to_string(),
            time: "07:00".to_string(),
            timezone: "America/Chicago".to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_secs: 5,
            max_delay_secs: 300,
            backoff_multiplier: 2.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

/// Resolve the configuration file path from `STANDINGS_CONFIG` or the default
pub fn config_path() -> PathBuf {
    std::env::var("STANDINGS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from a file and environment variables
pub fn load_config(path: &Path) -> Result<BotConfig> {
    dotenv::dotenv().ok();

    let mut config = if path.exists() {
        tracing::debug!("Loading configuration from file: {:?}", path);
        load_from_file(path)?
    } else {
        tracing::warn!("Configuration file {:?} not found, using defaults", path);
        BotConfig::default()
    };

    load_from_env(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<BotConfig> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|e| {
        BotError::Config(format!("Invalid configuration file {:?}: {}", path, e))
    })
}

/// Load configuration overrides from environment variables
fn load_from_env(config: &mut BotConfig) {
    if let Ok(token) = std::env::var("DISCORD_TOKEN") {
        config.discord.token = token;
    }

    if let Ok(timezone) = std::env::var("TIMEZONE") {
        config.schedule.timezone = timezone;
    }

    if let Ok(level) = std::env::var("STANDINGS_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Ok(format) = std::env::var("STANDINGS_LOG_FORMAT") {
        config.logging.format = format;
    }

    config.sleeper.apply_env();
}

/// Validate configuration
pub fn validate_config(config: &BotConfig) -> Result<()> {
    if config.discord.token.trim().is_empty() {
        return Err(BotError::Config("DISCORD_TOKEN is not set".to_string()));
    }

    if config.leagues.is_empty() {
        return Err(BotError::Config("No leagues configured".to_string()));
    }

    let mut channels = HashSet::new();
    for league in &config.leagues {
        if league.league_id.trim().is_empty() || league.channel_id.trim().is_empty() {
            return Err(BotError::Config(format!(
                "League {:?} needs both a league_id and a channel_id",
                league.name
            )));
        }
        if !channels.insert(league.channel_id.as_str()) {
            return Err(BotError::Config(format!(
                "Channel {} is bound to more than one league",
                league.channel_id
            )));
        }
    }

    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => {
            return Err(BotError::Config(format!(
                "Invalid log level: {}",
                config.logging.level
            )))
        }
    }

    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        _ => {
            return Err(BotError::Config(format!(
                "Invalid log format: {}",
                config.logging.format
            )))
        }
    }

    match config.render.format.as_str() {
        "png" | "text" => {}
        _ => {
            return Err(BotError::Config(format!(
                "Invalid render format: {}",
                config.render.format
            )))
        }
    }

    if config.metrics.enabled && config.metrics.port == 0 {
        return Err(BotError::Config(format!(
            "Invalid metrics port: {}",
            config.metrics.port
        )));
    }

    crate::scheduler::WeeklySchedule::from_config(&config.schedule)?;

    Ok(())
}
