use url::Url;

use super::{Delivery, Notifier};
use crate::config::{AppConfig, ChatConfig};
use crate::http::{redact_url, HttpClient, Idempotency};
use crate::{Error, Result};

/// Maximum message length for Telegram's sendMessage API.
pub const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

#[derive(serde::Deserialize)]
struct TelegramError {
    description: Option<String>,
}

/// Telegram Bot API notifier
pub struct TelegramNotifier {
    http: HttpClient,
    endpoint: Url,
    chat_id: String,
    parse_mode: String,
}

impl TelegramNotifier {
    pub fn new(http: HttpClient, config: &ChatConfig) -> Result<Self> {
        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.api_base.trim_end_matches('/'),
            config.bot_token.as_deref().unwrap_or_default()
        );

        Ok(Self {
            http,
            endpoint: Url::parse(&endpoint)?,
            chat_id: config.chat_id.clone().unwrap_or_default(),
            parse_mode: config.parse_mode.clone(),
        })
    }

    pub fn from_config(http: HttpClient, config: &AppConfig) -> Result<Self> {
        Self::new(http, &config.chat)
    }

    fn log_failure(&self, text: &str, reason: &str) {
        tracing::error!(
            endpoint = %redact_url(&self.endpoint),
            chat_id = %self.chat_id,
            parse_mode = %self.parse_mode,
            text_chars = text.chars().count(),
            reason,
            hint = "check the bot token and chat id, and that the bot has access to the chat",
            "Failed to send message to chat"
        );
    }

    async fn post(&self, text: &str) -> Result<()> {
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("parse_mode", self.parse_mode.as_str()),
        ];

        // sendMessage is not idempotent: a repeat could post the digest twice
        let response = self
            .http
            .send(self.http.post(self.endpoint.clone()).form(&form), Idempotency::NonIdempotent)
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<unreadable body: {}>", e.without_url()),
        };
        let description = serde_json::from_str::<TelegramError>(&body)
            .ok()
            .and_then(|e| e.description)
            .unwrap_or(body);

        Err(Error::DeliveryFailed(format!("HTTP {}: {}", status, description)))
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, message: Option<&str>) -> Result<Delivery> {
        let Some(text) = message else {
            tracing::info!("No important articles to send.");
            return Ok(Delivery::NothingToSend);
        };

        let chars = text.chars().count();
        if chars > TELEGRAM_MAX_MESSAGE_LENGTH {
            tracing::warn!(
                chars,
                limit = TELEGRAM_MAX_MESSAGE_LENGTH,
                "Digest exceeds the chat message limit and may be rejected"
            );
        }

        match self.post(text).await {
            Ok(()) => {
                tracing::info!(chat_id = %self.chat_id, "Message sent to chat successfully");
                Ok(Delivery::Sent)
            }
            Err(e) => {
                let reason = match e {
                    Error::DeliveryFailed(reason) => reason,
                    other => other.to_string(),
                };
                self.log_failure(text, &reason);
                Err(Error::DeliveryFailed(reason))
            }
        }
    }
}
