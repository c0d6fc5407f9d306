//! Service state and component wiring

use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use sleeper_fetcher::SleeperClient;
use tracing::{debug, info};

use crate::commands::{CommandHandler, CommandOutcome, IncomingMessage, LeagueDirectory};
use crate::config::{BotConfig, RenderConfig};
use crate::delivery::DiscordRestPoster;
use crate::error::Result;
use crate::gateway::GatewayHandler;
use crate::render::{PngTableRenderer, TableRenderer, TextTableRenderer};
use crate::scheduler::{post_all_leagues, BatchReport, WeeklySchedule, WeeklyScheduler};
use crate::standings::StandingsReporter;

/// Everything the bot needs at runtime, built once from configuration
pub struct BotService {
    pub config: BotConfig,
    pub reporter: Arc<StandingsReporter>,
    pub commands: CommandHandler,
    pub scheduler: Arc<WeeklyScheduler>,
}

impl BotService {
    /// Build the production service: Sleeper source, configured renderer,
    /// Discord poster
    pub fn new(config: BotConfig) -> Result<Self> {
        let schedule = WeeklySchedule::from_config(&config.schedule)?;

        let source = SleeperClient::new(config.sleeper.clone())?;
        let renderer = renderer_for(&config.render, schedule.tz);
        let poster = DiscordRestPoster::new(&config.discord)?;
        let reporter = Arc::new(StandingsReporter::new(
            Arc::new(source),
            renderer,
            Arc::new(poster),
        ));

        Ok(Self::with_reporter(config, schedule, reporter))
    }

    /// Wire the service around an existing reporter
    pub fn with_reporter(
        config: BotConfig,
        schedule: WeeklySchedule,
        reporter: Arc<StandingsReporter>,
    ) -> Self {
        let leagues = Arc::new(config.leagues.clone());
        let directory = Arc::new(LeagueDirectory::from_leagues(&leagues));
        info!("Loaded {} leagues", directory.len());

        let commands = CommandHandler::new(directory, Arc::clone(&reporter));
        let scheduler = Arc::new(WeeklyScheduler::new(
            schedule,
            config.schedule.retry.clone(),
            Arc::clone(&reporter),
            leagues,
        ));

        Self {
            config,
            reporter,
            commands,
            scheduler,
        }
    }

    /// Post every league's standings once
    pub async fn post_all_now(&self) -> BatchReport {
        let retry = &self.config.schedule.retry;
        post_all_leagues(&self.reporter, &self.config.leagues, retry).await
    }
}

/// PNG unless the configuration asks for plain text
fn renderer_for(config: &RenderConfig, tz: Tz) -> Arc<dyn TableRenderer> {
    match config.format.as_str() {
        "text" => Arc::new(TextTableRenderer::new(tz)),
        _ => Arc::new(PngTableRenderer::new(tz)),
    }
}

#[async_trait]
impl GatewayHandler for BotService {
    async fn on_ready(&self, user: &str) {
        info!("Logged in as {}", user);

        if !self.config.schedule.enabled {
            info!("Weekly schedule disabled");
            return;
        }

        if self.scheduler.ensure_scheduled() {
            let schedule = self.scheduler.schedule();
            info!(
                "Scheduled weekly standings for {:?} {} ({})",
                schedule.weekday,
                schedule.time.format("%H:%M"),
                schedule.tz.name()
            );
        } else {
            info!("Schedule already active, skipping duplicate setup.");
        }
    }

    async fn on_message(&self, message: IncomingMessage) {
        let outcome = self.commands.handle(&message).await;
        if outcome != CommandOutcome::Ignored {
            debug!(channel = %message.channel_id, "Command outcome: {:?}", outcome);
        }
    }
}
