//! Standings Bot
//!
//! Posts fantasy league standings computed from Sleeper data to Discord:
//! a weekly scheduled post for every configured league, and a live
//! "if the week ended now" table on the `!live` / `!livestandings` command.

pub mod commands;
pub mod config;
pub mod delivery;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod render;
pub mod scheduler;
pub mod service;
pub mod signals;
pub mod standings;
pub mod telemetry;

pub use config::{config_path, load_config, BotConfig, LeagueConfig};
pub use error::{BotError, DeliveryError, Result};
pub use gateway::DiscordGateway;
pub use logging::initialize_logging;
pub use service::BotService;
pub use signals::{graceful_shutdown, setup_signal_handlers};
