//! Conversation flows and the update dispatcher.
//!
//! Every inbound update is parsed into a [`Command`] at the transport
//! boundary, routed against the chat's session state, and handled by one
//! of the flow modules. Handler errors never propagate past
//! [`handle_update`]: each is logged and converted into a user-visible
//! reply via `BotError::user_message`, so the conversation always gets an
//! answer.

pub mod admin;
pub mod cart;
pub mod ordering;
pub mod registration;

use tracing::{error, warn};

use lunchroom_core::{ChatId, PaymentStatus, Role};

use crate::command::{Command, labels};
use crate::error::Result;
use crate::session::{Flow, OrderFlow, Session};
use crate::state::AppState;
use crate::telegram::types::{ReplyKeyboard, Update};

/// Handle one inbound update end to end.
///
/// This is the fail-soft boundary: any handler error is logged, answered
/// with its user-visible message, and swallowed.
pub async fn handle_update(state: &AppState, update: Update) {
    if let Some(query) = update.callback_query {
        let Some(message) = query.message else {
            warn!(query_id = %query.id, "callback query without message, dropping");
            return;
        };
        let chat = ChatId::new(message.chat.id);
        let data = query.data.unwrap_or_default();
        let result = handle_callback(state, chat, message.message_id, &data).await;
        reply_on_error(state, chat, result).await;
        return;
    }

    let Some(message) = update.message else {
        return;
    };
    let chat = ChatId::new(message.chat.id);

    if let Some(contact) = message.contact {
        let result = registration::handle_contact(state, chat, &contact.phone_number).await;
        reply_on_error(state, chat, result).await;
    } else if let Some(text) = message.text {
        let result = handle_text(state, chat, &text).await;
        reply_on_error(state, chat, result).await;
    }
}

/// Convert a handler error into a reply; a failed reply is only logged.
async fn reply_on_error(state: &AppState, chat: ChatId, result: Result<()>) {
    let Err(err) = result else { return };
    error!(%chat, error = %err, "handler failed");
    if let Err(send_err) = state.messenger().send_text(chat, &err.user_message()).await {
        error!(%chat, error = %send_err, "failed to deliver error reply");
    }
}

/// Route an inbound text message.
async fn handle_text(state: &AppState, chat: ChatId, text: &str) -> Result<()> {
    let session = hydrate_session(state, chat).await?;

    match Command::from_message(text) {
        Command::Start => registration::start(state, chat).await,
        Command::MakeOrder | Command::NextOrder => ordering::show_dates(state, chat).await,
        Command::ShowCart => cart::show_cart(state, chat).await,
        Command::MyOrders => cart::show_my_orders(state, chat).await,
        Command::Pay => cart::pay(state, chat).await,
        Command::Cancel => cart::cancel(state, chat).await,
        Command::MainMenu => show_main_menu(state, chat).await,
        Command::AllOrders => admin::all_orders(state, chat).await,
        Command::Broadcast => admin::broadcast_start(state, chat).await,
        Command::AddAddress => admin::add_address_start(state, chat).await,
        Command::ListChannels => admin::list_channels(state, chat).await,
        Command::Text(free_text) => route_free_text(state, chat, &session, &free_text).await,
        // These only arrive as callback payloads.
        Command::SelectDate(_) | Command::SelectAddress(_) => {
            unknown_command(state, chat).await
        }
    }
}

/// Route an inline-keyboard callback.
async fn handle_callback(
    state: &AppState,
    chat: ChatId,
    message_id: i64,
    data: &str,
) -> Result<()> {
    hydrate_session(state, chat).await?;

    match Command::from_callback(data)? {
        Command::SelectAddress(address) => {
            registration::choose_address(state, chat, message_id, &address).await
        }
        Command::SelectDate(date) => {
            ordering::select_date(state, chat, Some(message_id), date).await
        }
        Command::Pay => cart::pay(state, chat).await,
        Command::ShowCart => cart::show_cart(state, chat).await,
        Command::NextOrder => ordering::show_dates(state, chat).await,
        Command::MainMenu => show_main_menu(state, chat).await,
        // The parser never produces the rest from callback payloads.
        _ => unknown_command(state, chat).await,
    }
}

/// Free text means different things depending on where the conversation is.
async fn route_free_text(
    state: &AppState,
    chat: ChatId,
    session: &Session,
    text: &str,
) -> Result<()> {
    match session.flow {
        Flow::AwaitingName => registration::enter_name(state, chat, text).await,
        Flow::AwaitingBroadcast => admin::send_broadcast(state, chat, text).await,
        Flow::AwaitingNewAddress => admin::append_address(state, chat, text).await,
        Flow::Registered(OrderFlow::DateSelected | OrderFlow::ItemsBeingAdded) => {
            ordering::select_item(state, chat, text).await
        }
        _ => unknown_command(state, chat).await,
    }
}

/// Restore durable session facts from the identity store when missing.
///
/// This is the reconnection path: after a process restart the session map
/// is empty, but a chat that once registered can be recognized by its
/// chat id without re-asking for the contact.
async fn hydrate_session(state: &AppState, chat: ChatId) -> Result<Session> {
    let mut session = state.sessions().get(chat).await;
    if session.phone.is_none()
        && let Some(profile) = state.identity().find_by_chat(chat).await?
    {
        session.enter_registered(profile.phone, profile.role);
        state.sessions().put(chat, session.clone()).await;
    }
    Ok(session)
}

/// Show the role-appropriate main menu and return the ordering sub-flow
/// to idle.
pub(crate) async fn show_main_menu(state: &AppState, chat: ChatId) -> Result<()> {
    let mut session = state.sessions().get(chat).await;
    let role = session.role_or_default();
    if session.phone.is_some() {
        session.flow = Flow::Registered(OrderFlow::Idle);
        state.sessions().put(chat, session).await;
    }
    state
        .messenger()
        .send_with_reply_keyboard(chat, "Главное меню:", main_menu_keyboard(role))
        .await?;
    Ok(())
}

/// The main-menu reply keyboard for a role.
pub(crate) fn main_menu_keyboard(role: Role) -> ReplyKeyboard {
    match role {
        Role::Administrator => ReplyKeyboard::from_labels(&[
            &[labels::ALL_ORDERS, labels::BROADCAST],
            &[labels::ADD_ADDRESS, labels::LIST_CHANNELS],
        ]),
        Role::Customer => ReplyKeyboard::from_labels(&[&[labels::MAKE_ORDER, labels::CART]]),
    }
}

/// Localized payment-status label for user-facing views.
pub(crate) const fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Unpaid => "Не оплачено",
        PaymentStatus::Paid => "Оплачено",
    }
}

async fn unknown_command(state: &AppState, chat: ChatId) -> Result<()> {
    state
        .messenger()
        .send_text(
            chat,
            "Неизвестная команда. Пожалуйста, выберите действие из меню.",
        )
        .await?;
    Ok(())
}
