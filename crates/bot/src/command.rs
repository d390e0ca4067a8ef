//! Inbound command parsing.
//!
//! All string matching against button labels and callback payloads happens
//! here, at the transport boundary. The flow layer only ever sees tagged
//! [`Command`] values, so the state machine's transition logic stays free
//! of string literals.

use chrono::NaiveDate;

use crate::error::BotError;

/// Button labels shown on keyboards and matched on the way back in.
pub mod labels {
    /// Customer main menu: start an order.
    pub const MAKE_ORDER: &str = "Сделать заказ";
    /// Customer main menu: open the cart.
    pub const CART: &str = "Корзина";
    /// Orders for the currently selected date.
    pub const MY_ORDERS: &str = "Мои заказы";
    /// Pay the selected date's orders.
    pub const PAY: &str = "Оплатить";
    /// Cancel the selected date's orders.
    pub const CANCEL: &str = "Отмена";
    /// Return to the main menu.
    pub const MAIN_MENU: &str = "Вернуться в главное меню";
    /// Start another order.
    pub const NEXT_ORDER: &str = "Сделать следующий заказ";
    /// Admin main menu: every order of every user.
    pub const ALL_ORDERS: &str = "Список заказов";
    /// Admin main menu: broadcast to all users.
    pub const BROADCAST: &str = "Сообщить всем";
    /// Admin main menu: append a delivery address.
    pub const ADD_ADDRESS: &str = "Добавить адрес доставки";
    /// Admin main menu: list registered chats.
    pub const LIST_CHANNELS: &str = "Список чатов";
    /// Contact-request button shown to unregistered users.
    pub const SHARE_PHONE: &str = "Подтвердить номер телефона";
}

/// Callback payload prefixes.
mod payloads {
    /// Date selection: `date:DD.MM.YYYY`.
    pub const DATE: &str = "date:";
    /// Address selection during registration: `addr:<address>`.
    pub const ADDRESS: &str = "addr:";
    /// Pay the selected date from the cart view.
    pub const PAY_NOW: &str = "pay_now";
    /// Open the all-dates cart.
    pub const SHOW_CART: &str = "show_cart";
    /// Start another order.
    pub const NEXT_ORDER: &str = "next_order";
    /// Return to the main menu.
    pub const MAIN_MENU: &str = "main_menu";
}

/// One parsed inbound action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The `/start` command.
    Start,
    /// Open the date picker.
    MakeOrder,
    /// Show the all-dates cart.
    ShowCart,
    /// Show orders for the selected date.
    MyOrders,
    /// Pay the selected date's orders.
    Pay,
    /// Cancel the selected date's orders.
    Cancel,
    /// Return to the main menu.
    MainMenu,
    /// Open the date picker for a follow-up order.
    NextOrder,
    /// Admin: list every order.
    AllOrders,
    /// Admin: start a broadcast.
    Broadcast,
    /// Admin: start appending an address.
    AddAddress,
    /// Admin: list registered chats.
    ListChannels,
    /// A delivery date was picked.
    SelectDate(NaiveDate),
    /// A delivery address was picked during registration.
    SelectAddress(String),
    /// Free text: a name, a broadcast body, a new address, or a menu
    /// selection, depending on the current flow.
    Text(String),
}

impl Command {
    /// Parse an inbound text message.
    ///
    /// Unrecognized text is [`Command::Text`]; its meaning is decided by
    /// the session's flow position.
    #[must_use]
    pub fn from_message(text: &str) -> Self {
        match text.trim() {
            "/start" => Self::Start,
            labels::MAKE_ORDER => Self::MakeOrder,
            labels::CART => Self::ShowCart,
            labels::MY_ORDERS => Self::MyOrders,
            labels::PAY => Self::Pay,
            labels::CANCEL => Self::Cancel,
            labels::MAIN_MENU => Self::MainMenu,
            labels::NEXT_ORDER => Self::NextOrder,
            labels::ALL_ORDERS => Self::AllOrders,
            labels::BROADCAST => Self::Broadcast,
            labels::ADD_ADDRESS => Self::AddAddress,
            labels::LIST_CHANNELS => Self::ListChannels,
            other => Self::Text(other.to_string()),
        }
    }

    /// Parse an inline-keyboard callback payload.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::DateFormat`] for a date payload that does not
    /// parse, and for payloads this bot never generates.
    pub fn from_callback(data: &str) -> Result<Self, BotError> {
        if let Some(raw) = data.strip_prefix(payloads::DATE) {
            return parse_date(raw).map(Self::SelectDate);
        }
        if let Some(address) = data.strip_prefix(payloads::ADDRESS) {
            return Ok(Self::SelectAddress(address.to_string()));
        }
        match data {
            payloads::PAY_NOW => Ok(Self::Pay),
            payloads::SHOW_CART => Ok(Self::ShowCart),
            payloads::NEXT_ORDER => Ok(Self::NextOrder),
            payloads::MAIN_MENU => Ok(Self::MainMenu),
            other => Err(BotError::DateFormat(other.to_string())),
        }
    }

    /// Render the callback payload for selecting a date.
    #[must_use]
    pub fn date_payload(date: NaiveDate) -> String {
        format!("{}{}", payloads::DATE, date.format("%d.%m.%Y"))
    }

    /// Render the callback payload for selecting an address.
    #[must_use]
    pub fn address_payload(address: &str) -> String {
        format!("{}{address}", payloads::ADDRESS)
    }

    /// Payload for the pay-now inline button.
    #[must_use]
    pub const fn pay_now_payload() -> &'static str {
        payloads::PAY_NOW
    }

    /// Payload for the show-cart inline button.
    #[must_use]
    pub const fn show_cart_payload() -> &'static str {
        payloads::SHOW_CART
    }

    /// Payload for the next-order inline button.
    #[must_use]
    pub const fn next_order_payload() -> &'static str {
        payloads::NEXT_ORDER
    }

    /// Payload for the main-menu inline button.
    #[must_use]
    pub const fn main_menu_payload() -> &'static str {
        payloads::MAIN_MENU
    }
}

/// Parse a `DD.MM.YYYY` date, tolerating the dashed variant.
fn parse_date(raw: &str) -> Result<NaiveDate, BotError> {
    NaiveDate::parse_from_str(raw, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%m-%Y"))
        .map_err(|_| BotError::DateFormat(raw.to_string()))
}
