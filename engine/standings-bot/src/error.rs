//! Error types for the standings bot

use sleeper_fetcher::FetchError;
use thiserror::Error;

/// Result type for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that can occur in the standings bot
#[derive(Error, Debug)]
pub enum BotError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Posting a message to a channel failed
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("channel {channel_id} rejected message with status {status}: {body}")]
    Status {
        channel_id: String,
        status: u16,
        body: String,
    },

    #[error("bad channel: {0}")]
    BadChannel(String),
}
