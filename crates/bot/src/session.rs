//! Per-chat conversation state.
//!
//! A [`Session`] is transient by design: it is created on the first inbound
//! event from a chat and dies with the process. It is never a source of
//! truth: whenever its durable facts (phone, role) are missing, the
//! dispatcher reconstructs them from the identity store by chat id.

use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use lunchroom_core::{ChatId, PhoneNumber, Role};

/// Where a conversation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Waiting for a verified contact share.
    #[default]
    AwaitingContact,
    /// Contact received for an unknown phone; an address must be chosen.
    AwaitingAddress,
    /// Address chosen; waiting for the user's name.
    AwaitingName,
    /// Fully registered; the ordering sub-flow applies.
    Registered(OrderFlow),
    /// Administrator is typing a broadcast message.
    AwaitingBroadcast,
    /// Administrator is typing a new catalog address.
    AwaitingNewAddress,
}

/// Ordering sub-flow of a registered conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFlow {
    /// Main menu; nothing selected.
    #[default]
    Idle,
    /// The date picker is on screen.
    DateSelected,
    /// A date is fixed and the day menu is on screen; selections append
    /// line items and stay here.
    ItemsBeingAdded,
    /// The cart or per-date order list is on screen with pay/cancel
    /// actions offered.
    CartReview,
}

/// Ephemeral conversation state for one chat.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Current flow position.
    pub flow: Flow,
    /// Canonical phone, once known.
    pub phone: Option<PhoneNumber>,
    /// Role, once known.
    pub role: Option<Role>,
    /// Address picked during registration.
    pub selected_address: Option<String>,
    /// Delivery date of the ordering sub-flow.
    pub selected_date: Option<NaiveDate>,
    /// Localized weekday name of `selected_date`.
    pub selected_day_name: Option<String>,
}

impl Session {
    /// Mark the session registered and enter the main menu.
    pub fn enter_registered(&mut self, phone: PhoneNumber, role: Role) {
        self.phone = Some(phone);
        self.role = Some(role);
        self.flow = Flow::Registered(OrderFlow::Idle);
        self.selected_address = None;
    }

    /// Drop all registration progress and start over.
    pub fn reset_registration(&mut self) {
        *self = Self::default();
    }

    /// Role of the session, defaulting to customer until known.
    #[must_use]
    pub fn role_or_default(&self) -> Role {
        self.role.unwrap_or_default()
    }
}

/// Keyed store of live sessions.
///
/// One session per chat id; entries appear on first contact and are only
/// dropped when the process restarts.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<ChatId, Session>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the session for a chat, creating it if absent.
    pub async fn get(&self, chat: ChatId) -> Session {
        let mut inner = self.inner.lock().await;
        inner.entry(chat).or_default().clone()
    }

    /// Replace the session for a chat.
    pub async fn put(&self, chat: ChatId, session: Session) {
        let mut inner = self.inner.lock().await;
        inner.insert(chat, session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_creates_default_session() {
        let store = SessionStore::new();
        let session = store.get(ChatId::new(1)).await;
        assert_eq!(session.flow, Flow::AwaitingContact);
        assert!(session.phone.is_none());
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let store = SessionStore::new();
        let chat = ChatId::new(1);

        let mut session = store.get(chat).await;
        session.enter_registered(PhoneNumber::normalize("79160000000"), Role::Customer);
        store.put(chat, session).await;

        let reloaded = store.get(chat).await;
        assert_eq!(reloaded.flow, Flow::Registered(OrderFlow::Idle));
        assert_eq!(
            reloaded.phone,
            Some(PhoneNumber::normalize("79160000000"))
        );
    }

    #[tokio::test]
    async fn test_sessions_are_per_chat() {
        let store = SessionStore::new();
        let mut session = store.get(ChatId::new(1)).await;
        session.flow = Flow::AwaitingName;
        store.put(ChatId::new(1), session).await;

        let other = store.get(ChatId::new(2)).await;
        assert_eq!(other.flow, Flow::AwaitingContact);
    }

    #[test]
    fn test_reset_registration_clears_everything() {
        let mut session = Session {
            flow: Flow::AwaitingName,
            phone: Some(PhoneNumber::normalize("79160000000")),
            selected_address: Some("Main St 1".to_string()),
            ..Session::default()
        };
        session.reset_registration();
        assert_eq!(session.flow, Flow::AwaitingContact);
        assert!(session.phone.is_none());
        assert!(session.selected_address.is_none());
    }
}
