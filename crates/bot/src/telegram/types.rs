//! Telegram Bot API wire types.
//!
//! These types represent the subset of the Bot API needed for a
//! long-polling conversational bot: incoming updates (messages, shared
//! contacts, callback queries) and outgoing messages with reply or inline
//! keyboards.
//!
//! See: <https://core.telegram.org/bots/api>

use serde::{Deserialize, Serialize};

/// Envelope every Bot API method responds with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// The method's payload, present when `ok` is true.
    pub result: Option<T>,
    /// Human-readable error, present when `ok` is false.
    pub description: Option<String>,
}

/// One incoming update from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonically increasing update identifier.
    pub update_id: i64,
    /// A new text message or shared contact.
    #[serde(default)]
    pub message: Option<Message>,
    /// A button press on an inline keyboard.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// An incoming or edited chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message identifier, unique within the chat.
    pub message_id: i64,
    /// The chat the message belongs to.
    pub chat: Chat,
    /// Text content, if any.
    #[serde(default)]
    pub text: Option<String>,
    /// Shared contact, if any.
    #[serde(default)]
    pub contact: Option<Contact>,
}

/// The conversation a message belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Unique chat identifier.
    pub id: i64,
}

/// A phone contact shared through the "request contact" button.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    /// Raw phone number as the client sent it.
    pub phone_number: String,
}

/// A press on an inline-keyboard button.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Query identifier, used to acknowledge the press.
    pub id: String,
    /// The message the pressed keyboard was attached to.
    #[serde(default)]
    pub message: Option<Message>,
    /// Opaque payload of the pressed button.
    #[serde(default)]
    pub data: Option<String>,
}

/// A reply keyboard shown under the input field.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboard {
    /// Button rows.
    pub keyboard: Vec<Vec<KeyboardButton>>,
    /// Fit the keyboard to its buttons.
    pub resize_keyboard: bool,
    /// Hide the keyboard after one use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_time_keyboard: Option<bool>,
}

impl ReplyKeyboard {
    /// Build a keyboard from rows of plain-text button labels.
    #[must_use]
    pub fn from_labels(rows: &[&[&str]]) -> Self {
        Self {
            keyboard: rows
                .iter()
                .map(|row| row.iter().map(|label| KeyboardButton::text(*label)).collect())
                .collect(),
            resize_keyboard: true,
            one_time_keyboard: None,
        }
    }

    /// Build a keyboard from owned rows of plain-text button labels.
    #[must_use]
    pub fn from_label_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            keyboard: rows
                .into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::text).collect())
                .collect(),
            resize_keyboard: true,
            one_time_keyboard: None,
        }
    }

    /// Hide the keyboard after the first press.
    #[must_use]
    pub const fn one_time(mut self) -> Self {
        self.one_time_keyboard = Some(true);
        self
    }
}

/// One button of a reply keyboard.
#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    /// Button label, echoed back as message text when pressed.
    pub text: String,
    /// Ask the client to share the user's phone contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_contact: Option<bool>,
}

impl KeyboardButton {
    /// A plain text button.
    #[must_use]
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            text: label.into(),
            request_contact: None,
        }
    }

    /// A button that shares the user's phone contact when pressed.
    #[must_use]
    pub fn request_contact(label: impl Into<String>) -> Self {
        Self {
            text: label.into(),
            request_contact: Some(true),
        }
    }
}

/// An inline keyboard attached to a message.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboard {
    /// Button rows.
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Build a keyboard of one button per row.
    #[must_use]
    pub fn from_rows(rows: Vec<InlineButton>) -> Self {
        Self {
            inline_keyboard: rows.into_iter().map(|button| vec![button]).collect(),
        }
    }
}

/// One button of an inline keyboard.
#[derive(Debug, Clone, Serialize)]
pub struct InlineButton {
    /// Button label.
    pub text: String,
    /// Opaque payload delivered back in a [`CallbackQuery`].
    pub callback_data: String,
}

impl InlineButton {
    /// Create a new inline button.
    #[must_use]
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_with_contact_deserializes() {
        let json = r#"{
            "update_id": 7,
            "message": {
                "message_id": 1,
                "chat": {"id": 42},
                "contact": {"phone_number": "+7 916 000 00 00"}
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(
            message.contact.unwrap().phone_number,
            "+7 916 000 00 00"
        );
        assert!(message.text.is_none());
    }

    #[test]
    fn test_callback_query_deserializes() {
        let json = r#"{
            "update_id": 8,
            "callback_query": {
                "id": "abc",
                "message": {"message_id": 5, "chat": {"id": 42}},
                "data": "date:01.09.2025"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.data.as_deref(), Some("date:01.09.2025"));
        assert_eq!(query.message.unwrap().message_id, 5);
    }

    #[test]
    fn test_reply_keyboard_serializes_without_absent_flags() {
        let keyboard = ReplyKeyboard::from_labels(&[&["Сделать заказ", "Корзина"]]);
        let json = serde_json::to_value(&keyboard).unwrap();
        assert_eq!(json["resize_keyboard"], true);
        assert!(json.get("one_time_keyboard").is_none());
        assert_eq!(json["keyboard"][0][1]["text"], "Корзина");
        assert!(json["keyboard"][0][0].get("request_contact").is_none());
    }

    #[test]
    fn test_contact_button_serializes_flag() {
        let button = KeyboardButton::request_contact("Подтвердить номер телефона");
        let json = serde_json::to_value(&button).unwrap();
        assert_eq!(json["request_contact"], true);
    }

    #[test]
    fn test_inline_keyboard_one_button_per_row() {
        let keyboard = InlineKeyboard::from_rows(vec![
            InlineButton::new("a", "pa"),
            InlineButton::new("b", "pb"),
        ]);
        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[0].len(), 1);
    }
}
