//! Telegram Bot API transport.
//!
//! The conversation flows talk to the transport through the [`Messenger`]
//! trait; [`TelegramClient`] is the production implementation. Integration
//! tests substitute a scripted messenger that records outbound traffic.

pub mod client;
pub mod error;
pub mod types;

pub use client::TelegramClient;
pub use error::TelegramError;

use async_trait::async_trait;
use lunchroom_core::ChatId;

use types::{InlineKeyboard, ReplyKeyboard};

/// Outbound side of the messaging transport.
///
/// Chat ids are stable session keys; every method targets one chat. A send
/// failure is a [`TelegramError`], never a panic; broadcast fan-out logs a
/// failed recipient and continues.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TelegramError>;

    /// Send text with a reply keyboard of selectable labels.
    async fn send_with_reply_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: ReplyKeyboard,
    ) -> Result<(), TelegramError>;

    /// Send text with inline buttons carrying callback payloads.
    async fn send_with_inline_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<(), TelegramError>;

    /// Edit a previously sent message in place.
    async fn edit_text(
        &self,
        chat: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), TelegramError>;
}
