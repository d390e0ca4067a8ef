//! Telegram Bot API client.
//!
//! Long-polls `getUpdates` and sends outbound messages. Each call checks
//! the API envelope and surfaces `ok=false` as [`TelegramError::Api`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use lunchroom_core::ChatId;

use super::Messenger;
use super::error::TelegramError;
use super::types::{ApiResponse, InlineKeyboard, ReplyKeyboard, Update};

/// Telegram Bot API base URL.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API client for polling updates and sending messages.
#[derive(Clone)]
pub struct TelegramClient {
    /// HTTP client.
    client: Client,
    /// Bot token for authentication.
    token: SecretString,
    /// Long-polling timeout in seconds.
    poll_timeout_secs: u64,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("token", &"[REDACTED]")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a new Telegram client.
    #[must_use]
    pub fn new(token: SecretString, poll_timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            token,
            poll_timeout_secs,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{TELEGRAM_API_BASE}/bot{}/{method}",
            self.token.expose_secret()
        )
    }

    /// Call one Bot API method and unwrap the response envelope.
    async fn call<T, P>(&self, method: &str, payload: &P) -> Result<T, TelegramError>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        let response = self
            .client
            .post(self.method_url(method))
            // getUpdates blocks server-side for the poll timeout; leave
            // headroom so the HTTP layer does not give up first.
            .timeout(Duration::from_secs(self.poll_timeout_secs + 10))
            .json(payload)
            .send()
            .await
            .map_err(|e| TelegramError::Request(e.to_string()))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TelegramError::Response(e.to_string()))?;

        if !envelope.ok {
            return Err(TelegramError::Api(
                envelope
                    .description
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::Response("ok response without result".to_string()))
    }

    /// Fetch the next batch of updates, blocking up to the poll timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Telegram rejects the call.
    #[instrument(skip(self))]
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        #[derive(Serialize)]
        struct GetUpdates {
            offset: i64,
            timeout: u64,
        }

        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &GetUpdates {
                    offset,
                    timeout: self.poll_timeout_secs,
                },
            )
            .await?;

        if !updates.is_empty() {
            debug!(count = updates.len(), "Received updates");
        }

        Ok(updates)
    }

    /// Acknowledge a callback query so the client stops showing a spinner.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Telegram rejects the call.
    #[instrument(skip(self), fields(query_id = %query_id))]
    pub async fn answer_callback_query(&self, query_id: &str) -> Result<(), TelegramError> {
        #[derive(Serialize)]
        struct AnswerCallbackQuery<'a> {
            callback_query_id: &'a str,
        }

        let _: bool = self
            .call(
                "answerCallbackQuery",
                &AnswerCallbackQuery {
                    callback_query_id: query_id,
                },
            )
            .await?;

        Ok(())
    }
}

/// Outgoing `sendMessage` payload.
#[derive(Serialize)]
struct SendMessage<'a, K: Serialize> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<K>,
}

/// A `sendMessage`/`editMessageText` result we never inspect further.
#[derive(Debug, serde::Deserialize)]
struct SentMessage {}

#[async_trait]
impl Messenger for TelegramClient {
    #[instrument(skip(self, text), fields(chat = %chat))]
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TelegramError> {
        let _: SentMessage = self
            .call(
                "sendMessage",
                &SendMessage::<()> {
                    chat_id: chat.as_i64(),
                    text,
                    reply_markup: None,
                },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, text, keyboard), fields(chat = %chat))]
    async fn send_with_reply_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: ReplyKeyboard,
    ) -> Result<(), TelegramError> {
        let _: SentMessage = self
            .call(
                "sendMessage",
                &SendMessage {
                    chat_id: chat.as_i64(),
                    text,
                    reply_markup: Some(keyboard),
                },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, text, keyboard), fields(chat = %chat))]
    async fn send_with_inline_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<(), TelegramError> {
        let _: SentMessage = self
            .call(
                "sendMessage",
                &SendMessage {
                    chat_id: chat.as_i64(),
                    text,
                    reply_markup: Some(keyboard),
                },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, text), fields(chat = %chat, message_id))]
    async fn edit_text(
        &self,
        chat: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), TelegramError> {
        #[derive(Serialize)]
        struct EditMessageText<'a> {
            chat_id: i64,
            message_id: i64,
            text: &'a str,
        }

        let _: SentMessage = self
            .call(
                "editMessageText",
                &EditMessageText {
                    chat_id: chat.as_i64(),
                    message_id,
                    text,
                },
            )
            .await?;
        Ok(())
    }
}
