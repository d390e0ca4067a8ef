//! Ordering flow: date picker, day menu, item selection.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};

use lunchroom_core::{ChatId, PaymentStatus};

use crate::command::{Command, labels};
use crate::error::{BotError, Result};
use crate::menu::{DaySnapshot, weekday_name};
use crate::session::{Flow, OrderFlow};
use crate::state::AppState;
use crate::store::OrderLine;
use crate::telegram::types::{InlineButton, InlineKeyboard, ReplyKeyboard};

/// How many upcoming days the date picker offers.
const PICKER_DAYS: i64 = 7;

/// The dates to offer, starting today.
///
/// Today drops out once the configured cutoff time has passed; without a
/// cutoff every day stays selectable.
pub(crate) fn dates_to_offer(
    today: NaiveDate,
    now: NaiveTime,
    cutoff: Option<NaiveTime>,
) -> Vec<NaiveDate> {
    (0..PICKER_DAYS)
        .map(|offset| today + Duration::days(offset))
        .filter(|date| *date != today || cutoff.is_none_or(|cutoff| now < cutoff))
        .collect()
}

/// Show the date picker.
pub async fn show_dates(state: &AppState, chat: ChatId) -> Result<()> {
    let mut session = state.sessions().get(chat).await;
    if session.phone.is_none() {
        state
            .messenger()
            .send_text(
                chat,
                "Ваш номер телефона не зарегистрирован, перезапустите бота командой /start.",
            )
            .await?;
        return Ok(());
    }

    let now = Local::now();
    let dates = dates_to_offer(now.date_naive(), now.time(), state.config().same_day_cutoff);

    let keyboard = InlineKeyboard::from_rows(
        dates
            .into_iter()
            .map(|date| {
                InlineButton::new(
                    format!(
                        "{} ({})",
                        date.format("%d.%m.%Y"),
                        weekday_name(date.weekday())
                    ),
                    Command::date_payload(date),
                )
            })
            .collect(),
    );

    session.flow = Flow::Registered(OrderFlow::DateSelected);
    state.sessions().put(chat, session).await;

    state
        .messenger()
        .send_with_inline_keyboard(chat, "Выберите дату:", keyboard)
        .await?;
    Ok(())
}

/// Handle a picked date: fix it in the session and show that day's menu.
pub async fn select_date(
    state: &AppState,
    chat: ChatId,
    picker_message_id: Option<i64>,
    date: NaiveDate,
) -> Result<()> {
    let mut session = state.sessions().get(chat).await;
    if session.phone.is_none() {
        state
            .messenger()
            .send_text(
                chat,
                "Ваш номер телефона не зарегистрирован, перезапустите бота командой /start.",
            )
            .await?;
        return Ok(());
    }

    let day_name = weekday_name(date.weekday());
    if let Some(message_id) = picker_message_id {
        state
            .messenger()
            .edit_text(
                chat,
                message_id,
                &format!("Вы выбрали дату: {} ({day_name})", date.format("%d.%m.%Y")),
            )
            .await?;
    }

    // Fresh snapshot on every read; no caching layer.
    let snapshot = DaySnapshot::filter(state.menu().fetch().await?, date);
    if snapshot.is_empty() {
        state
            .messenger()
            .send_text(chat, "К сожалению, на эту дату нет меню.")
            .await?;
        return Ok(());
    }

    session.selected_date = Some(date);
    session.selected_day_name = Some(day_name.to_string());
    session.flow = Flow::Registered(OrderFlow::ItemsBeingAdded);
    state.sessions().put(chat, session).await;

    let mut rows = snapshot.selection_rows();
    rows.push(vec![labels::MY_ORDERS.to_string()]);
    rows.push(vec![labels::MAIN_MENU.to_string()]);

    state
        .messenger()
        .send_with_reply_keyboard(
            chat,
            &render_day_menu(&snapshot, date, day_name),
            ReplyKeyboard::from_label_rows(rows),
        )
        .await?;
    Ok(())
}

/// Handle a selected dish or set-menu label: append one line item.
///
/// Re-entrant: the conversation stays in the selection state so any number
/// of items can be added for the same date.
pub async fn select_item(state: &AppState, chat: ChatId, label: &str) -> Result<()> {
    let session = state.sessions().get(chat).await;
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
            .send_text(chat, "Выберите дату, прежде чем заказывать обед.")
            .await?;
        return Ok(());
    };

    // Resolve against a fresh snapshot; an unknown label writes nothing.
    let snapshot = DaySnapshot::filter(state.menu().fetch().await?, date);
    let Some(price) = snapshot.resolve_price(label) else {
        return Err(BotError::PriceNotFound(label.to_string()));
    };

    let weekday = session
        .selected_day_name
        .clone()
        .unwrap_or_else(|| weekday_name(date.weekday()).to_string());

    state
        .ledger()
        .append(OrderLine {
            phone: phone.digits(),
            date,
            weekday,
            item: label.to_string(),
            price,
            status: PaymentStatus::Unpaid,
        })
        .await?;

    state
        .messenger()
        .send_text(chat, &format!("Ваш выбор ({label}) записан! Цена: {price}"))
        .await?;

    let keyboard = InlineKeyboard::from_rows(vec![
        InlineButton::new(labels::NEXT_ORDER, Command::next_order_payload()),
        InlineButton::new("Перейти в корзину", Command::show_cart_payload()),
        InlineButton::new(labels::MAIN_MENU, Command::main_menu_payload()),
    ]);
    state
        .messenger()
        .send_with_inline_keyboard(chat, "Заказ успешно добавлен! Что дальше?", keyboard)
        .await?;
    Ok(())
}

/// Render the day menu text, dishes grouped under category headers.
fn render_day_menu(snapshot: &DaySnapshot, date: NaiveDate, day_name: &str) -> String {
    let mut text = format!("Меню на {} ({day_name})\n\n", date.format("%d.%m.%Y"));
    for category in snapshot.categories() {
        if snapshot.is_set_menu(category) {
            // One shared price for the whole set.
            if let Some(first) = snapshot.rows_in(category).next() {
                text.push_str(&format!("{category} ({}):\n", first.price));
            }
            for (index, row) in snapshot.rows_in(category).enumerate() {
                text.push_str(&format!("{}. {}\n", index + 1, row.dish));
            }
        } else {
            text.push_str(&format!("{category}:\n"));
            for row in snapshot.rows_in(category) {
                text.push_str(&format!("• {} - {}\n", row.dish, row.price));
            }
        }
        text.push('\n');
    }
    text
}
