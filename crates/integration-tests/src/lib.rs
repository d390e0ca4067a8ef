//! Integration tests for Lunchroom.
//!
//! [`TestContext`] wires the real dispatcher, stores and session machine
//! against a scripted transport and a static menu source, so the scenario
//! tests under `tests/` drive whole conversations the way the polling
//! loop would.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Datelike, Duration, Local, NaiveDate};
use rust_decimal::Decimal;
use secrecy::SecretString;
use tempfile::TempDir;

use lunchroom_bot::config::BotConfig;
use lunchroom_bot::flow;
use lunchroom_bot::menu::{MenuError, MenuRow, MenuSource, week_parity, weekday_name};
use lunchroom_bot::state::AppState;
use lunchroom_bot::telegram::types::{
    CallbackQuery, Chat, Contact, InlineKeyboard, Message, ReplyKeyboard, Update,
};
use lunchroom_bot::telegram::{Messenger, TelegramError};
use lunchroom_core::{ChatId, PhoneNumber, Price, Role};

/// What kind of outbound message was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentKind {
    /// Plain text.
    Text,
    /// Text with a reply keyboard; flattened button labels.
    ReplyKeyboard { labels: Vec<String> },
    /// Text with an inline keyboard; `(label, payload)` per button.
    InlineKeyboard { buttons: Vec<(String, String)> },
    /// In-place edit of an earlier message.
    Edit { message_id: i64 },
}

/// One recorded outbound message.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat: ChatId,
    pub text: String,
    pub kind: SentKind,
}

/// Transport double that records outbound traffic and can be told to fail
/// deliveries to specific chats.
#[derive(Debug, Default)]
pub struct ScriptedMessenger {
    sent: Mutex<Vec<SentMessage>>,
    failing: Mutex<HashSet<i64>>,
}

impl ScriptedMessenger {
    fn record(&self, message: SentMessage) {
        self.sent.lock().unwrap().push(message);
    }

    fn check_delivery(&self, chat: ChatId) -> Result<(), TelegramError> {
        if self.failing.lock().unwrap().contains(&chat.as_i64()) {
            return Err(TelegramError::Api(format!(
                "Forbidden: bot was blocked by the user in chat {chat}"
            )));
        }
        Ok(())
    }

    /// Make every delivery to `chat` fail from now on.
    pub fn fail_sends_to(&self, chat: ChatId) {
        self.failing.lock().unwrap().insert(chat.as_i64());
    }

    /// Everything sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Everything sent to one chat so far.
    #[must_use]
    pub fn sent_to(&self, chat: ChatId) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|message| message.chat == chat)
            .collect()
    }

    /// Message texts sent to one chat so far.
    #[must_use]
    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.sent_to(chat)
            .into_iter()
            .map(|message| message.text)
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TelegramError> {
        self.check_delivery(chat)?;
        self.record(SentMessage {
            chat,
            text: text.to_string(),
            kind: SentKind::Text,
        });
        Ok(())
    }

    async fn send_with_reply_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: ReplyKeyboard,
    ) -> Result<(), TelegramError> {
        self.check_delivery(chat)?;
        self.record(SentMessage {
            chat,
            text: text.to_string(),
            kind: SentKind::ReplyKeyboard {
                labels: keyboard
                    .keyboard
                    .into_iter()
                    .flatten()
                    .map(|button| button.text)
                    .collect(),
            },
        });
        Ok(())
    }

    async fn send_with_inline_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<(), TelegramError> {
        self.check_delivery(chat)?;
        self.record(SentMessage {
            chat,
            text: text.to_string(),
            kind: SentKind::InlineKeyboard {
                buttons: keyboard
                    .inline_keyboard
                    .into_iter()
                    .flatten()
                    .map(|button| (button.text, button.callback_data))
                    .collect(),
            },
        });
        Ok(())
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), TelegramError> {
        self.check_delivery(chat)?;
        self.record(SentMessage {
            chat,
            text: text.to_string(),
            kind: SentKind::Edit { message_id },
        });
        Ok(())
    }
}

/// Menu source returning a fixed snapshot.
#[derive(Debug)]
pub struct StaticMenu {
    rows: Vec<MenuRow>,
}

impl StaticMenu {
    #[must_use]
    pub fn new(rows: Vec<MenuRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl MenuSource for StaticMenu {
    async fn fetch(&self) -> Result<Vec<MenuRow>, MenuError> {
        Ok(self.rows.clone())
    }
}

/// A fully wired bot instance over temp files and a scripted transport.
pub struct TestContext {
    pub state: AppState,
    pub messenger: Arc<ScriptedMessenger>,
    config: BotConfig,
    menu: Arc<StaticMenu>,
    update_id: AtomicI64,
    _dir: TempDir,
}

impl TestContext {
    /// Build a context serving the given menu snapshot.
    #[must_use]
    pub fn new(menu_rows: Vec<MenuRow>) -> Self {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            bot_token: SecretString::from("123456:test-token"),
            menu_feed_url: "http://localhost/menu.csv".to_string(),
            users_file: dir.path().join("users.json"),
            addresses_file: dir.path().join("addresses.json"),
            orders_file: dir.path().join("orders.csv"),
            same_day_cutoff: None,
            poll_timeout_secs: 1,
        };
        let messenger = Arc::new(ScriptedMessenger::default());
        let menu = Arc::new(StaticMenu::new(menu_rows));
        let state = AppState::new(config.clone(), messenger.clone(), menu.clone());

        Self {
            state,
            messenger,
            config,
            menu,
            update_id: AtomicI64::new(1),
            _dir: dir,
        }
    }

    /// Simulate a process restart: same files, fresh sessions.
    pub fn restart(&mut self) {
        self.state = AppState::new(
            self.config.clone(),
            self.messenger.clone(),
            self.menu.clone(),
        );
    }

    fn next_id(&self) -> i64 {
        self.update_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Deliver an inbound text message.
    pub async fn send_text(&self, chat: ChatId, text: &str) {
        let id = self.next_id();
        flow::handle_update(
            &self.state,
            Update {
                update_id: id,
                message: Some(Message {
                    message_id: id,
                    chat: Chat { id: chat.as_i64() },
                    text: Some(text.to_string()),
                    contact: None,
                }),
                callback_query: None,
            },
        )
        .await;
    }

    /// Deliver an inbound contact share.
    pub async fn send_contact(&self, chat: ChatId, phone: &str) {
        let id = self.next_id();
        flow::handle_update(
            &self.state,
            Update {
                update_id: id,
                message: Some(Message {
                    message_id: id,
                    chat: Chat { id: chat.as_i64() },
                    text: None,
                    contact: Some(Contact {
                        phone_number: phone.to_string(),
                    }),
                }),
                callback_query: None,
            },
        )
        .await;
    }

    /// Deliver an inline-button press.
    pub async fn send_callback(&self, chat: ChatId, data: &str) {
        let id = self.next_id();
        flow::handle_update(
            &self.state,
            Update {
                update_id: id,
                message: None,
                callback_query: Some(CallbackQuery {
                    id: id.to_string(),
                    message: Some(Message {
                        message_id: id,
                        chat: Chat { id: chat.as_i64() },
                        text: None,
                        contact: None,
                    }),
                    data: Some(data.to_string()),
                }),
            },
        )
        .await;
    }

    /// Seed one catalog address directly.
    pub async fn seed_address(&self, address: &str) {
        self.state.addresses().append(address).await.unwrap();
    }

    /// Seed a registered profile directly.
    pub async fn seed_profile(&self, phone: &str, name: &str, role: Role, chat: Option<ChatId>) {
        self.state
            .identity()
            .insert(lunchroom_bot::store::UserProfile {
                phone: PhoneNumber::normalize(phone),
                role,
                address: "Main St 1".to_string(),
                name: name.to_string(),
                chat_id: chat,
            })
            .await
            .unwrap();
    }

    /// Run the whole registration dialog for a new customer.
    ///
    /// Assumes the catalog contains "Main St 1".
    pub async fn register_customer(&self, chat: ChatId, phone: &str, name: &str) {
        self.send_contact(chat, phone).await;
        self.send_callback(chat, "addr:Main St 1").await;
        self.send_text(chat, name).await;
    }

    /// Texts sent to one chat.
    #[must_use]
    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.messenger.texts_to(chat)
    }

    /// The most recent message sent to one chat.
    ///
    /// # Panics
    ///
    /// Panics if nothing was sent to the chat.
    #[must_use]
    pub fn last_to(&self, chat: ChatId) -> SentMessage {
        self.messenger
            .sent_to(chat)
            .into_iter()
            .next_back()
            .expect("no messages sent to chat")
    }
}

/// Tomorrow's date, safely inside the picker regardless of any cutoff.
#[must_use]
pub fn tomorrow() -> NaiveDate {
    Local::now().date_naive() + Duration::days(1)
}

/// A menu snapshot serving `date`: a two-dish set lunch at 250, a salad at
/// 100 and a drink at 50.
#[must_use]
pub fn sample_menu_for(date: NaiveDate) -> Vec<MenuRow> {
    let weekday = weekday_name(date.weekday()).to_string();
    let parity = week_parity(date);
    let row = |category: &str, dish: &str, price: i64| MenuRow {
        weekday: weekday.clone(),
        week_parity: parity,
        category: category.to_string(),
        dish: dish.to_string(),
        price: Price::new(Decimal::from(price)),
    };
    vec![
        row("Комплексный обед", "Борщ", 250),
        row("Комплексный обед", "Котлета с пюре", 250),
        row("Салат", "Цезарь", 100),
        row("Напиток", "Чай", 50),
    ]
}
