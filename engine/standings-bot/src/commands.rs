//! Chat command surface (`!livestandings` / `!live`)

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::LeagueConfig;
use crate::delivery::OutgoingMessage;
use crate::standings::StandingsReporter;
use crate::telemetry;

pub const NOT_LINKED_REPLY: &str = "This channel isn’t linked to a league for live standings.";
pub const FALLBACK_REPLY: &str = "Something went wrong handling that command.";

/// Accepts `!livestandings` or `!live`, ignoring case and surrounding space
pub fn is_live_command(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    text == "!livestandings" || text == "!live"
}

/// Immutable channel id -> league mapping built once at startup
#[derive(Debug, Clone, Default)]
pub struct LeagueDirectory {
    by_channel: HashMap<String, LeagueConfig>,
}

impl LeagueDirectory {
    pub fn from_leagues(leagues: &[LeagueConfig]) -> Self {
        let by_channel = leagues
            .iter()
            .map(|l| (l.channel_id.clone(), l.clone()))
            .collect();
        Self { by_channel }
    }

    pub fn league_for(&self, channel_id: &str) -> Option<&LeagueConfig> {
        self.by_channel.get(channel_id)
    }

    pub fn len(&self) -> usize {
        self.by_channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_channel.is_empty()
    }
}

/// Chat message as seen by the command handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: String,
    pub channel_id: String,
    /// `None` for direct messages
    pub guild_id: Option<String>,
    pub author_is_bot: bool,
    pub content: String,
}

/// What the handler did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Ignored,
    NotLinked,
    Posted { week: u32 },
    Failed,
}

/// Routes live-standings commands to the reporter
pub struct CommandHandler {
    directory: Arc<LeagueDirectory>,
    reporter: Arc<StandingsReporter>,
}

impl CommandHandler {
    pub fn new(directory: Arc<LeagueDirectory>, reporter: Arc<StandingsReporter>) -> Self {
        Self {
            directory,
            reporter,
        }
    }

    /// Handle one message. Never returns an error: failures become chat replies.
    pub async fn handle(&self, message: &IncomingMessage) -> CommandOutcome {
        if message.author_is_bot
            || message.guild_id.is_none()
            || !is_live_command(&message.content)
        {
            return CommandOutcome::Ignored;
        }

        let Some(league) = self.directory.league_for(&message.channel_id) else {
            debug!(channel = %message.channel_id, "Live command in unlinked channel");
            let reply = OutgoingMessage::reply(NOT_LINKED_REPLY, &message.id);
            self.send(message, reply).await;
            return CommandOutcome::NotLinked;
        };

        info!(league = %league.name, channel = %message.channel_id, "Live standings requested");
        match self.reporter.post_live(league, &message.channel_id).await {
            Ok(week) => {
                telemetry::record_live_command(true);
                CommandOutcome::Posted { week }
            }
            Err(e) => {
                telemetry::record_live_command(false);
                error!(league = %league.name, "live standings error: {}", e);
                let apology = format!("Sorry, couldn't compute live standings: {}", e);
                self.send(message, OutgoingMessage::text(apology)).await;
                CommandOutcome::Failed
            }
        }
    }

    /// Send a reply, falling back to a generic message if that fails too
    async fn send(&self, message: &IncomingMessage, reply: OutgoingMessage) {
        let poster = self.reporter.poster();
        if let Err(e) = poster.post(&message.channel_id, reply).await {
            error!(channel = %message.channel_id, "message handler error: {}", e);
            let fallback = OutgoingMessage::reply(FALLBACK_REPLY, &message.id);
            if let Err(e) = poster.post(&message.channel_id, fallback).await {
                error!(channel = %message.channel_id, "fallback reply failed: {}", e);
            }
        }
    }
}
