//! Message delivery to chat channels

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::config::DiscordConfig;
use crate::error::DeliveryError;

/// File attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Message to post in a channel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutgoingMessage {
    pub content: String,
    pub attachment: Option<Attachment>,
    /// Message id this one replies to
    pub reply_to: Option<String>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn reply(content: impl Into<String>, message_id: &str) -> Self {
        Self {
            content: content.into(),
            reply_to: Some(message_id.to_string()),
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// JSON body understood by the Discord create-message endpoint
    pub fn payload(&self) -> serde_json::Value {
        let mut payload = json!({ "content": self.content });
        if let Some(message_id) = &self.reply_to {
            payload["message_reference"] = json!({
                "message_id": message_id,
                "fail_if_not_exists": false
            });
        }
        if let Some(attachment) = &self.attachment {
            payload["attachments"] = json!([{ "id": 0, "filename": attachment.file_name }]);
        }
        payload
    }
}

/// Posts messages to a channel identified by an opaque id
#[async_trait]
pub trait ChannelPoster: Send + Sync {
    async fn post(&self, channel_id: &str, message: OutgoingMessage) -> Result<(), DeliveryError>;
}

/// Discord REST API poster
#[derive(Debug, Clone)]
pub struct DiscordRestPoster {
    client: Client,
    api_base_url: String,
    token: String,
}

impl DiscordRestPoster {
    pub fn new(config: &DiscordConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl ChannelPoster for DiscordRestPoster {
    async fn post(
        &self,
        channel_id: &str,
        message: OutgoingMessage,
    ) -> Result<(), DeliveryError> {
        if channel_id.is_empty() || !channel_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(DeliveryError::BadChannel(channel_id.to_string()));
        }

        let url = format!("{}/channels/{}/messages", self.api_base_url, channel_id);
        let request = self
            .client
            .post(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bot {}", self.token),
            );

        let payload = message.payload();
        let request = match message.attachment {
            Some(attachment) => {
                let file = Part::bytes(attachment.bytes)
                    .file_name(attachment.file_name)
                    .mime_str(&attachment.content_type)?;
                let form = Form::new()
                    .text("payload_json", payload.to_string())
                    .part("files[0]", file);
                request.multipart(form)
            }
            None => request.json(&payload),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                channel_id: channel_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        debug!("Posted message to channel {}", channel_id);
        Ok(())
    }
}
