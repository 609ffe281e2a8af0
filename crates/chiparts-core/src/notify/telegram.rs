//! Telegram Bot API delivery

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};
use url::Url;

use super::{DeliveryResult, Notifier};
use crate::config::TelegramConfig;
use crate::error::{Error, Result};

/// Sends messages to a fixed set of Telegram chats
pub struct TelegramNotifier {
    client: Client,
    endpoint: Url,
    chat_ids: Vec<String>,
}

impl TelegramNotifier {
    /// Create a notifier for the configured bot and destinations
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("chiparts/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut endpoint = config.api_base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| Error::config(format!("invalid Telegram API URL: {}", config.api_base_url)))?
            .pop_if_empty()
            .push(&format!("bot{}", config.bot_token))
            .push("sendMessage");

        Ok(Self {
            client,
            endpoint,
            chat_ids: config.chat_ids.clone(),
        })
    }

    /// Deliver to a single chat
    async fn send_to(&self, chat_id: &str, text: &str) -> DeliveryResult {
        let sent_at = Utc::now();
        let result = self.post_message(chat_id, text).await;

        match &result {
            Ok(()) => info!(chat_id = %chat_id, "Order notification delivered"),
            Err(e) => error!(chat_id = %chat_id, error = %e, "Order notification failed"),
        }

        DeliveryResult {
            chat_id: chat_id.to_string(),
            success: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            sent_at,
        }
    }

    async fn post_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> std::result::Result<(), NotificationError> {
        let payload = SendMessagePayload {
            chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::HttpError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected(format!(
                "Telegram returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Vec<DeliveryResult> {
        join_all(
            self.chat_ids
                .iter()
                .map(|chat_id| self.send_to(chat_id, message)),
        )
        .await
    }

    fn destinations(&self) -> usize {
        self.chat_ids.len()
    }
}

/// Per-destination delivery errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}
