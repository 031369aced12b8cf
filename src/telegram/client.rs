//! Telegram Bot API client

use super::types::{
    ApiResponse, GetUpdatesRequest, Message, ReplyMarkup, SendMessageRequest, Update,
};
use super::TransportError;
use crate::runtime::{ChatId, Destination, InboundBatch, InboundMessage, Transport, UpdateSource};
use crate::wizard::{Prompt, UserIdentity};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Seconds the server holds a `getUpdates` call open waiting for updates
pub const POLL_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

pub struct TelegramClient {
    client: Client,
    /// `{api}/bot{token}`; never logged
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str, api_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 30))
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        })
    }

    async fn call<Req, Res>(&self, method: &str, body: &Req) -> Result<Res, TransportError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the bot token
                let e = e.without_url();
                if e.is_timeout() {
                    TransportError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::network(format!("Connection failed: {e}"))
                } else {
                    TransportError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let parsed: ApiResponse<Res> = serde_json::from_str(&body).map_err(|e| {
            TransportError::unknown(format!("Failed to parse {method} response: {e}"))
        })?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TransportError::unknown(format!(
                "{method} failed: {}",
                description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }

    async fn send(
        &self,
        chat_id: ChatId,
        thread_id: Option<i64>,
        text: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> Result<(), TransportError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            message_thread_id: thread_id,
            reply_markup,
        };
        let _: Message = self.call("sendMessage", &request).await?;
        Ok(())
    }
}

/// Map a failed Bot API call to a kind. Telegram's `description` already reads
/// like "Bad Request: chat not found", so it is kept as the message.
fn classify_error(status: reqwest::StatusCode, body: &str) -> TransportError {
    let parsed: Option<ApiResponse<serde_json::Value>> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|p| p.description.clone())
        .unwrap_or_else(|| format!("HTTP {status}: {body}"));

    match status.as_u16() {
        401 | 404 => TransportError::auth(format!("Bot token rejected: {message}")),
        403 => TransportError::auth(message),
        429 => {
            let mut err = TransportError::rate_limit(message);
            if let Some(retry_after) = parsed
                .and_then(|p| p.parameters)
                .and_then(|p| p.retry_after)
            {
                err = err.with_retry_after(Duration::from_secs(retry_after));
            }
            err
        }
        400 => TransportError::invalid_request(message),
        500..=599 => TransportError::server_error(message),
        _ => TransportError::unknown(message),
    }
}

/// Reduce an update to a wizard input. Only human text messages in private
/// chats drive the wizard; everything else is skipped.
pub fn to_inbound(update: Update) -> Option<InboundMessage> {
    let message = update.message?;
    if !message.chat.is_private() {
        return None;
    }
    let from = message.from?;
    if from.is_bot {
        return None;
    }
    let text = message.text?;
    tracing::debug!(
        update_id = update.update_id,
        message_id = message.message_id,
        chat_id = message.chat.id,
        "Inbound text message"
    );
    Some(InboundMessage {
        chat_id: message.chat.id,
        user: UserIdentity::new(from.id, from.full_name()),
        text,
    })
}

/// Offset that acknowledges every update in the batch
fn next_offset(updates: &[Update], current: Option<i64>) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .or(current)
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), TransportError> {
        self.send(
            chat_id,
            None,
            &prompt.text,
            Some(ReplyMarkup::keyboard(prompt.keyboard())),
        )
        .await
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.send(chat_id, None, text, Some(ReplyMarkup::remove())).await
    }

    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
    ) -> Result<(), TransportError> {
        self.send(destination.chat_id, destination.thread_id, text, None)
            .await
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn poll(&self, offset: Option<i64>) -> Result<InboundBatch, TransportError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: POLL_TIMEOUT_SECS,
            allowed_updates: vec!["message"],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;
        let next = next_offset(&updates, offset);
        Ok(InboundBatch {
            messages: updates.into_iter().filter_map(to_inbound).collect(),
            next_offset: next,
        })
    }
}
