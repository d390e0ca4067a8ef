//! Administrator controls: broadcast, address catalog, global views.
//!
//! Every handler checks the session role first; a non-administrator gets
//! [`BotError::PermissionDenied`] and no state change.

use tracing::{info, warn};

use lunchroom_core::ChatId;

use crate::error::{BotError, Result};
use crate::session::{Flow, OrderFlow};
use crate::state::AppState;

use super::status_label;

/// Fail unless the chat's session carries the administrator role.
async fn ensure_admin(state: &AppState, chat: ChatId) -> Result<()> {
    let session = state.sessions().get(chat).await;
    if session.role_or_default().is_admin() {
        Ok(())
    } else {
        Err(BotError::PermissionDenied)
    }
}

/// List every order of every user, ungrouped.
pub async fn all_orders(state: &AppState, chat: ChatId) -> Result<()> {
    ensure_admin(state, chat).await?;

    let lines = state.ledger().all().await?;
    if lines.is_empty() {
        state.messenger().send_text(chat, "Заказов пока нет.").await?;
        return Ok(());
    }

    let mut text = "Список всех заказов:\n\n".to_string();
    for line in &lines {
        text.push_str(&format!(
            "Номер телефона: {}\nДата: {}\nОбед: {}\nЦена: {}\nСтатус оплаты: {}\n\n",
            line.phone,
            line.date.format("%d.%m.%Y"),
            line.item,
            line.price,
            status_label(line.status),
        ));
    }
    state.messenger().send_text(chat, &text).await?;
    Ok(())
}

/// Ask for the broadcast text.
pub async fn broadcast_start(state: &AppState, chat: ChatId) -> Result<()> {
    ensure_admin(state, chat).await?;

    let mut session = state.sessions().get(chat).await;
    session.flow = Flow::AwaitingBroadcast;
    state.sessions().put(chat, session).await;

    state
        .messenger()
        .send_text(
            chat,
            "Введите сообщение, которое вы хотите отправить всем пользователям.",
        )
        .await?;
    Ok(())
}

/// Send a broadcast to every profile with a linked chat.
///
/// Best-effort fan-out: a failed delivery is logged and skipped, the rest
/// still go out, and the administrator is told the broadcast completed.
pub async fn send_broadcast(state: &AppState, chat: ChatId, text: &str) -> Result<()> {
    ensure_admin(state, chat).await?;

    let profiles = state.identity().list().await?;
    let message = format!("[Сообщение от администратора]\n{text}");

    let mut delivered = 0usize;
    for profile in profiles {
        let Some(target) = profile.chat_id else { continue };
        match state.messenger().send_text(target, &message).await {
            Ok(()) => delivered += 1,
            Err(err) => {
                warn!(chat = %target, error = %err, "broadcast delivery failed");
            }
        }
    }
    info!(delivered, "broadcast finished");

    let mut session = state.sessions().get(chat).await;
    session.flow = Flow::Registered(OrderFlow::Idle);
    state.sessions().put(chat, session).await;

    state
        .messenger()
        .send_text(chat, "Сообщение было отправлено всем пользователям.")
        .await?;
    Ok(())
}

/// Ask for the new catalog address.
pub async fn add_address_start(state: &AppState, chat: ChatId) -> Result<()> {
    ensure_admin(state, chat).await?;

    let mut session = state.sessions().get(chat).await;
    session.flow = Flow::AwaitingNewAddress;
    state.sessions().put(chat, session).await;

    state
        .messenger()
        .send_text(
            chat,
            "Введите адрес, который вы хотите добавить в список доступных для доставки.",
        )
        .await?;
    Ok(())
}

/// Append one address to the shared catalog.
///
/// The only validation is non-empty text.
pub async fn append_address(state: &AppState, chat: ChatId, text: &str) -> Result<()> {
    ensure_admin(state, chat).await?;

    let address = text.trim();
    if address.is_empty() {
        state
            .messenger()
            .send_text(chat, "Адрес не может быть пустым.")
            .await?;
        return Ok(());
    }

    state.addresses().append(address).await?;

    let mut session = state.sessions().get(chat).await;
    session.flow = Flow::Registered(OrderFlow::Idle);
    state.sessions().put(chat, session).await;

    state
        .messenger()
        .send_text(chat, &format!("Адрес '{address}' был успешно добавлен."))
        .await?;
    Ok(())
}

/// List every profile's name and linked chat id.
pub async fn list_channels(state: &AppState, chat: ChatId) -> Result<()> {
    ensure_admin(state, chat).await?;

    let profiles = state.identity().list().await?;
    let mut text = "Список чатов пользователей:\n\n".to_string();
    for profile in &profiles {
        let channel = profile
            .chat_id
            .map_or_else(|| "не указан".to_string(), |id| id.to_string());
        text.push_str(&format!("Имя: {}, chat_id: {channel}\n", profile.name));
    }
    state.messenger().send_text(chat, &text).await?;
    Ok(())
}
