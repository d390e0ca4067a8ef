//! Registration flow: contact share → address choice → name.
//!
//! Identity is anchored to the phone number. A shared contact either links
//! the chat to an existing profile or opens the registration dialog; a
//! profile is only ever created at the final step, with every required
//! fact present.

use tracing::info;

use lunchroom_core::{ChatId, PhoneNumber, Role};

use crate::command::{Command, labels};
use crate::error::{BotError, Result};
use crate::session::Flow;
use crate::state::AppState;
use crate::store::UserProfile;
use crate::telegram::types::{InlineButton, InlineKeyboard, KeyboardButton, ReplyKeyboard};

use super::main_menu_keyboard;

/// Handle the `start` entry event.
///
/// A chat already linked to a profile short-circuits straight to the main
/// menu; anyone else is asked to share their phone contact.
pub async fn start(state: &AppState, chat: ChatId) -> Result<()> {
    if let Some(profile) = state.identity().find_by_chat(chat).await? {
        let mut session = state.sessions().get(chat).await;
        session.enter_registered(profile.phone.clone(), profile.role);
        state.sessions().put(chat, session).await;

        info!(%chat, name = %profile.name, role = %profile.role, "known chat reconnected");
        state
            .messenger()
            .send_with_reply_keyboard(
                chat,
                &format!("Добро пожаловать, {}!", profile.name),
                main_menu_keyboard(profile.role),
            )
            .await?;
        return Ok(());
    }

    let mut session = state.sessions().get(chat).await;
    session.reset_registration();
    state.sessions().put(chat, session).await;

    let keyboard = ReplyKeyboard {
        keyboard: vec![vec![KeyboardButton::request_contact(labels::SHARE_PHONE)]],
        resize_keyboard: true,
        one_time_keyboard: Some(true),
    };
    state
        .messenger()
        .send_with_reply_keyboard(chat, "Пожалуйста, подтвердите ваш номер телефона.", keyboard)
        .await?;
    Ok(())
}

/// Handle a shared contact.
///
/// A known phone links the chat to its profile. An unknown phone opens the
/// address choice; an empty catalog terminates this attempt with
/// [`BotError::NoAddressesAvailable`] and no state change.
pub async fn handle_contact(state: &AppState, chat: ChatId, raw_phone: &str) -> Result<()> {
    let phone = PhoneNumber::normalize(raw_phone);

    if let Some(profile) = state.identity().find_by_phone(&phone).await? {
        state.identity().link_chat(&phone, chat).await?;

        let mut session = state.sessions().get(chat).await;
        session.enter_registered(profile.phone.clone(), profile.role);
        state.sessions().put(chat, session).await;

        info!(%chat, name = %profile.name, "existing profile linked to chat");
        state
            .messenger()
            .send_with_reply_keyboard(
                chat,
                &format!("Добро пожаловать, {}!", profile.name),
                main_menu_keyboard(profile.role),
            )
            .await?;
        return Ok(());
    }

    let addresses = state.addresses().list().await?;
    if addresses.is_empty() {
        return Err(BotError::NoAddressesAvailable);
    }

    let mut session = state.sessions().get(chat).await;
    session.phone = Some(phone);
    session.flow = Flow::AwaitingAddress;
    state.sessions().put(chat, session).await;

    let keyboard = InlineKeyboard::from_rows(
        addresses
            .iter()
            .map(|address| InlineButton::new(address, Command::address_payload(address)))
            .collect(),
    );
    state
        .messenger()
        .send_with_inline_keyboard(chat, "Выберите адрес доставки:", keyboard)
        .await?;
    Ok(())
}

/// Handle the address pick during registration.
pub async fn choose_address(
    state: &AppState,
    chat: ChatId,
    message_id: i64,
    address: &str,
) -> Result<()> {
    let mut session = state.sessions().get(chat).await;
    if session.flow != Flow::AwaitingAddress || session.phone.is_none() {
        session.reset_registration();
        state.sessions().put(chat, session).await;
        return Err(BotError::Registration(
            "address chosen outside registration".to_string(),
        ));
    }

    session.selected_address = Some(address.to_string());
    session.flow = Flow::AwaitingName;
    state.sessions().put(chat, session).await;

    state
        .messenger()
        .edit_text(
            chat,
            message_id,
            &format!("Адрес доставки выбран: {address}. Введите ваше имя:"),
        )
        .await?;
    Ok(())
}

/// Handle the name entry and create the profile.
///
/// Missing phone or address here is a logic error: the flow aborts back to
/// the contact step instead of persisting a malformed profile.
pub async fn enter_name(state: &AppState, chat: ChatId, name: &str) -> Result<()> {
    let mut session = state.sessions().get(chat).await;

    let (Some(phone), Some(address)) =
        (session.phone.clone(), session.selected_address.clone())
    else {
        session.reset_registration();
        state.sessions().put(chat, session).await;
        return Err(BotError::Registration(
            "phone or address missing at name entry".to_string(),
        ));
    };

    let name = name.trim();
    let profile = UserProfile {
        phone: phone.clone(),
        role: Role::Customer,
        address,
        name: name.to_string(),
        chat_id: Some(chat),
    };
    state.identity().insert(profile).await?;

    session.enter_registered(phone, Role::Customer);
    state.sessions().put(chat, session).await;

    info!(%chat, name, "profile created");
    state
        .messenger()
        .send_text(chat, &format!("Регистрация завершена. Добро пожаловать, {name}!"))
        .await?;
    state
        .messenger()
        .send_with_reply_keyboard(
            chat,
            &format!("Теперь вы можете заказывать, {name}!"),
            main_menu_keyboard(Role::Customer),
        )
        .await?;
    Ok(())
}
