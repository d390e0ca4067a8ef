//! Unified error handling for the bot.
//!
//! Provides a unified [`BotError`] type that every flow handler returns.
//! The dispatch boundary converts each error into a user-visible reply via
//! [`BotError::user_message`], so the conversation always gets an answer
//! even when the underlying operation failed (fail-soft policy).

use thiserror::Error;

use crate::menu::MenuError;
use crate::store::StoreError;
use crate::telegram::TelegramError;

/// Application-level error type for the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Messaging transport operation failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TelegramError),

    /// Menu feed operation failed.
    #[error("Menu error: {0}")]
    Menu(#[from] MenuError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A required registration fact (phone, address, name) was missing at
    /// a step that needs it. The current flow is aborted back to the start.
    #[error("Registration error: {0}")]
    Registration(String),

    /// The delivery address catalog is empty; registration cannot proceed.
    #[error("No delivery addresses available")]
    NoAddressesAvailable,

    /// A selected label could not be resolved against the current menu
    /// snapshot; nothing was written to the ledger.
    #[error("Price not found for: {0}")]
    PriceNotFound(String),

    /// A pay or cancel action matched zero ledger rows; nothing changed.
    #[error("No matching orders")]
    NoMatchingOrders,

    /// A callback carried an unparseable date payload.
    #[error("Bad date payload: {0}")]
    DateFormat(String),

    /// A non-administrator invoked an administrator-only action.
    #[error("Permission denied")]
    PermissionDenied,
}

impl BotError {
    /// The reply text shown to the user for this error.
    ///
    /// Infrastructure failures collapse to a generic apology; domain
    /// errors explain what went wrong in the user's terms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) | Self::Menu(_) | Self::Store(_) => {
                "Произошла ошибка. Пожалуйста, попробуйте снова.".to_string()
            }
            Self::Registration(_) => "Ошибка регистрации. Попробуйте ещё раз.".to_string(),
            Self::NoAddressesAvailable => {
                "Список адресов доставки недоступен. Свяжитесь с администратором.".to_string()
            }
            Self::PriceNotFound(label) => format!("Цена для {label} не найдена в меню."),
            Self::NoMatchingOrders => "У вас нет заказов на эту дату.".to_string(),
            Self::DateFormat(raw) => {
                format!("Некорректный формат даты: {raw}. Используйте формат ДД.ММ.ГГГГ.")
            }
            Self::PermissionDenied => {
                "У вас нет прав для использования этой функции.".to_string()
            }
        }
    }
}

/// Result type alias for `BotError`.
pub type Result<T> = std::result::Result<T, BotError>;
