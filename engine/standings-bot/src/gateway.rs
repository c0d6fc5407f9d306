//! Discord gateway session over a websocket
//!
//! The session follows the gateway handshake: the server sends Hello with a
//! heartbeat interval, the client identifies and then heartbeats with the last
//! sequence number it has seen. A heartbeat still unacknowledged when the
//! next one is due marks the connection as dead. Dispatch events are handed
//! to a [`GatewayHandler`]. Dropped sessions are reconnected with backoff.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::commands::IncomingMessage;
use crate::config::DiscordConfig;
use crate::error::{BotError, Result};

pub const INTENT_GUILDS: u64 = 1;
pub const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
pub const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;
pub const INTENTS: u64 = INTENT_GUILDS | INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT;

const OP_DISPATCH: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_IDENTIFY: u8 = 2;
const OP_RECONNECT: u8 = 7;
const OP_INVALID_SESSION: u8 = 9;
const OP_HELLO: u8 = 10;
const OP_HEARTBEAT_ACK: u8 = 11;

/// Close codes after which reconnecting cannot help
const FATAL_CLOSE_CODES: [u16; 6] = [4004, 4010, 4011, 4012, 4013, 4014];

/// Raw gateway frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

/// Dispatch events the bot reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Ready { user: String },
    MessageCreate(IncomingMessage),
}

impl GatewayEvent {
    /// Interpret a dispatch (op 0) by event name; unknown events are `None`
    pub fn from_dispatch(event: &str, data: &Value) -> Option<Self> {
        match event {
            "READY" => {
                let user = data
                    .pointer("/user/username")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                Some(Self::Ready {
                    user: user.to_string(),
                })
            }
            "MESSAGE_CREATE" => {
                let text = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);
                let author_is_bot = data
                    .pointer("/author/bot")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                Some(Self::MessageCreate(IncomingMessage {
                    id: text("id")?,
                    channel_id: text("channel_id")?,
                    guild_id: text("guild_id"),
                    author_is_bot,
                    content: text("content").unwrap_or_default(),
                }))
            }
            _ => None,
        }
    }
}

/// Receives gateway events
#[async_trait]
pub trait GatewayHandler: Send + Sync {
    /// Called on every READY, including after a reconnect
    async fn on_ready(&self, user: &str);

    async fn on_message(&self, message: IncomingMessage);
}

pub fn identify_payload(token: &str) -> Value {
    json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "standings-bot",
                "device": "standings-bot"
            }
        }
    })
}

pub fn heartbeat_payload(sequence: Option<u64>) -> Value {
    json!({ "op": OP_HEARTBEAT, "d": sequence })
}

fn heartbeat_message(sequence: Option<u64>) -> Message {
    Message::Text(heartbeat_payload(sequence).to_string())
}

/// Heartbeat interval advertised by a Hello frame
pub fn hello_interval(payload: &GatewayPayload) -> Option<Duration> {
    if payload.op != OP_HELLO {
        return None;
    }
    let millis = payload.d.get("heartbeat_interval").and_then(Value::as_u64)?;
    Some(Duration::from_millis(millis.max(1)))
}

pub fn is_fatal_close(code: u16) -> bool {
    FATAL_CLOSE_CODES.contains(&code)
}

/// How a session ended without a transport error
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionEnd {
    Reconnect,
    Fatal(String),
}

/// Long-running gateway client
pub struct DiscordGateway {
    config: DiscordConfig,
    handler: Arc<dyn GatewayHandler>,
}

impl DiscordGateway {
    pub fn new(config: DiscordConfig, handler: Arc<dyn GatewayHandler>) -> Self {
        Self { config, handler }
    }

    /// Keep a session open until a fatal close
    pub async fn run(&self) -> Result<()> {
        let initial_delay = Duration::from_secs(self.config.reconnect_delay_secs);
        let max_delay = Duration::from_secs(self.config.max_reconnect_delay_secs);
        let mut delay = initial_delay;

        loop {
            match self.run_session().await {
                Ok(SessionEnd::Reconnect) => {
                    info!("Gateway session ended, reconnecting");
                    delay = initial_delay;
                }
                Ok(SessionEnd::Fatal(reason)) => {
                    error!("Gateway closed the session: {}", reason);
                    return Err(BotError::Gateway(reason));
                }
                Err(e) => {
                    warn!("Gateway session failed: {}, reconnecting in {:?}", e, delay);
                }
            }

            sleep(delay).await;
            delay = (delay * 2).min(max_delay);
        }
    }

    async fn run_session(&self) -> Result<SessionEnd> {
        debug!("Connecting to gateway {}", self.config.gateway_url);
        let (ws_stream, _) = connect_async(self.config.gateway_url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        let heartbeat_every = match read.next().await {
            Some(Ok(Message::Text(text))) => {
                let payload: GatewayPayload = serde_json::from_str(&text)?;
                hello_interval(&payload).ok_or_else(|| {
                    BotError::Gateway(format!("Expected Hello, got op {}", payload.op))
                })?
            }
            Some(Ok(other)) => {
                let reason = format!("Unexpected first frame: {:?}", other);
                return Err(BotError::Gateway(reason));
            }
            Some(Err(e)) => return Err(e.into()),
            None => return Ok(SessionEnd::Reconnect),
        };

        let identify = identify_payload(&self.config.token).to_string();
        write.send(Message::Text(identify)).await?;
        debug!("Identified, heartbeating every {:?}", heartbeat_every);

        let mut heartbeat = interval(heartbeat_every);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.tick().await;

        let mut sequence: Option<u64> = None;
        let mut awaiting_ack = false;
        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if awaiting_ack {
                        warn!("Heartbeat was not acknowledged, reconnecting");
                        return Ok(SessionEnd::Reconnect);
                    }
                    write.send(heartbeat_message(sequence)).await?;
                    awaiting_ack = true;
                }
                frame = read.next() => {
                    let Some(frame) = frame else {
                        return Ok(SessionEnd::Reconnect);
                    };
                    match frame? {
                        Message::Text(text) => {
                            let payload: GatewayPayload = serde_json::from_str(&text)?;
                            if payload.s.is_some() {
                                sequence = payload.s;
                            }
                            match payload.op {
                                OP_DISPATCH => self.dispatch(&payload).await,
                                OP_HEARTBEAT => write.send(heartbeat_message(sequence)).await?,
                                OP_HEARTBEAT_ACK => awaiting_ack = false,
                                OP_RECONNECT => return Ok(SessionEnd::Reconnect),
                                OP_INVALID_SESSION => {
                                    warn!("Gateway invalidated the session");
                                    return Ok(SessionEnd::Reconnect);
                                }
                                op => debug!("Ignoring gateway op {}", op),
                            }
                        }
                        Message::Ping(data) => write.send(Message::Pong(data)).await?,
                        Message::Close(frame) => {
                            if let Some(frame) = frame {
                                let code = u16::from(frame.code);
                                if is_fatal_close(code) {
                                    let reason = format!("close code {}: {}", code, frame.reason);
                                    return Ok(SessionEnd::Fatal(reason));
                                }
                                info!("Gateway closed with code {}", code);
                            }
                            return Ok(SessionEnd::Reconnect);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    async fn dispatch(&self, payload: &GatewayPayload) {
        let Some(name) = payload.t.as_deref() else {
            return;
        };
        match GatewayEvent::from_dispatch(name, &payload.d) {
            Some(GatewayEvent::Ready { user }) => self.handler.on_ready(&user).await,
            Some(GatewayEvent::MessageCreate(message)) => {
                let handler = Arc::clone(&self.handler);
                tokio::spawn(async move {
                    handler.on_message(message).await;
                });
            }
            None => debug!("Ignoring dispatch {}", name),
        }
    }
}
