use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::Notifier;
use crate::config::ChatConfig;
use crate::credentials::Credentials;
use crate::model::message::{ChatSpace, NotificationMessage};

pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Posts messages through the Google Chat REST API with a static API key.
pub struct GoogleChatNotifier {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    text: &'a str,
}

impl GoogleChatNotifier {
    pub fn new(config: &ChatConfig, credentials: &dyn Credentials) -> Result<Self> {
        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: credentials.chat_api_key()?,
            client: reqwest::Client::new(),
        })
    }

    fn messages_url(&self, space: &ChatSpace) -> String {
        format!("{}/v1/{}/messages", self.api_url, space)
    }
}

#[async_trait]
impl Notifier for GoogleChatNotifier {
    fn name(&self) -> &str {
        "Google Chat"
    }

    async fn notify(&self, message: &NotificationMessage, space: &ChatSpace) -> Result<()> {
        let payload = ChatPayload {
            text: &message.text,
        };

        let response = self
            .client
            .post(self.messages_url(space))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to post message to {space}"))?;

        // Delivery is fire-and-forget: a rejected message is logged, not retried or surfaced.
        let status = response.status();
        if status.is_success() {
            debug!(space = %space, "Chat message delivered");
        } else {
            warn!(space = %space, status = %status, "Chat service rejected message");
        }
        Ok(())
    }
}
