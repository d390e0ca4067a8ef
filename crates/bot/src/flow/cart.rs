//! Cart views and the pay/cancel actions.
//!
//! Two read views exist: the per-date order list (tied to the session's
//! selected date) and the full cart grouped by date across every date.
//! Pay and cancel are always scoped to the selected date, never the whole
//! cart, and flip or remove all of that date's rows atomically.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use lunchroom_core::{ChatId, PaymentStatus, Price};

use crate::command::{Command, labels};
use crate::error::{BotError, Result};
use crate::session::{Flow, OrderFlow};
use crate::state::AppState;
use crate::store::OrderLine;
use crate::telegram::types::{InlineButton, InlineKeyboard, ReplyKeyboard};

use super::{show_main_menu, status_label};

/// Show the orders for the currently selected date, with pay/cancel.
pub async fn show_my_orders(state: &AppState, chat: ChatId) -> Result<()> {
    let mut session = state.sessions().get(chat).await;
    let Some(phone) = session.phone.clone() else {
        state
            .messenger()
            .send_text(
                chat,
                "Ваш номер телефона не зарегистрирован, перезапустите бота командой /start.",
            )
            .await?;
        return Ok(());
    };
    let Some(date) = session.selected_date else {
        state
            .messenger()
            .send_text(chat, "Выберите дату, чтобы увидеть заказы.")
            .await?;
        return Ok(());
    };

    let lines = state.ledger().lines_for_date(&phone.digits(), date).await?;
    if lines.is_empty() {
        state
            .messenger()
            .send_text(
                chat,
                &format!("На {} у вас нет заказов.", date.format("%d.%m.%Y")),
            )
            .await?;
        return Ok(());
    }

    let mut text = format!("Ваши заказы на {}:\n\n", date.format("%d.%m.%Y"));
    push_lines(&mut text, &lines);
    let total: Price = lines.iter().map(|line| line.price).sum();
    text.push_str(&format!("\nИтого к оплате: {total}"));

    session.flow = Flow::Registered(OrderFlow::CartReview);
    state.sessions().put(chat, session).await;

    let keyboard =
        ReplyKeyboard::from_labels(&[&[labels::PAY], &[labels::CANCEL]]).one_time();
    state
        .messenger()
        .send_with_reply_keyboard(chat, &text, keyboard)
        .await?;
    Ok(())
}

/// Show the full cart: every line item across all dates, grouped by date
/// with a running total per group.
pub async fn show_cart(state: &AppState, chat: ChatId) -> Result<()> {
    let mut session = state.sessions().get(chat).await;
    let Some(phone) = session.phone.clone() else {
        state
            .messenger()
            .send_text(
                chat,
                "Ваш номер телефона не зарегистрирован, перезапустите бота командой /start.",
            )
            .await?;
        return Ok(());
    };

    let lines = state.ledger().lines_for_phone(&phone.digits()).await?;
    if lines.is_empty() {
        state
            .messenger()
            .send_text(chat, "У вас пока нет заказов.")
            .await?;
        return Ok(());
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<OrderLine>> = BTreeMap::new();
    for line in lines {
        by_date.entry(line.date).or_default().push(line);
    }

    let mut text = "Ваши заказы:\n\n".to_string();
    for (date, group) in &by_date {
        text.push_str(&format!("Заказы на {}:\n", date.format("%d.%m.%Y")));
        push_lines(&mut text, group);
        let total: Price = group.iter().map(|line| line.price).sum();
        text.push_str(&format!("Итого к оплате: {total}\n\n"));
    }

    session.flow = Flow::Registered(OrderFlow::CartReview);
    state.sessions().put(chat, session).await;

    let keyboard = InlineKeyboard::from_rows(vec![
        InlineButton::new(labels::PAY, Command::pay_now_payload()),
        InlineButton::new(labels::NEXT_ORDER, Command::next_order_payload()),
        InlineButton::new(labels::MAIN_MENU, Command::main_menu_payload()),
    ]);
    state
        .messenger()
        .send_with_inline_keyboard(chat, &text, keyboard)
        .await?;
    Ok(())
}

/// Pay every order of the selected date.
pub async fn pay(state: &AppState, chat: ChatId) -> Result<()> {
    let mut session = state.sessions().get(chat).await;
    let (Some(phone), Some(date)) = (session.phone.clone(), session.selected_date) else {
        state
            .messenger()
            .send_text(chat, "Ошибка: не удалось найти данные о заказе.")
            .await?;
        return Ok(());
    };

    let updated = state.ledger().pay(&phone.digits(), date).await?;
    if updated == 0 {
        return Err(BotError::NoMatchingOrders);
    }

    session.flow = Flow::Registered(OrderFlow::Idle);
    state.sessions().put(chat, session).await;

    let keyboard = InlineKeyboard::from_rows(vec![
        InlineButton::new(labels::NEXT_ORDER, Command::next_order_payload()),
        InlineButton::new(labels::MAIN_MENU, Command::main_menu_payload()),
    ]);
    state
        .messenger()
        .send_with_inline_keyboard(chat, "Ваши заказы успешно оплачены!", keyboard)
        .await?;
    Ok(())
}

/// Cancel every order of the selected date.
pub async fn cancel(state: &AppState, chat: ChatId) -> Result<()> {
    let mut session = state.sessions().get(chat).await;
    let (Some(phone), Some(date)) = (session.phone.clone(), session.selected_date) else {
        state
            .messenger()
            .send_text(chat, "Ошибка: не удалось найти данные о заказе.")
            .await?;
        return Ok(());
    };

    let removed = state.ledger().cancel(&phone.digits(), date).await?;
    if removed == 0 {
        return Err(BotError::NoMatchingOrders);
    }

    session.flow = Flow::Registered(OrderFlow::Idle);
    session.selected_date = None;
    session.selected_day_name = None;
    state.sessions().put(chat, session).await;

    state
        .messenger()
        .send_text(chat, "Ваши заказы успешно отменены!")
        .await?;
    show_main_menu(state, chat).await
}

/// Append one bullet per line item, marking paid rows.
fn push_lines(text: &mut String, lines: &[OrderLine]) {
    for line in lines {
        text.push_str(&format!("• {} - {}", line.item, line.price));
        if line.status == PaymentStatus::Paid {
            text.push_str(&format!(" ({})", status_label(line.status)));
        }
        text.push('\n');
    }
}
