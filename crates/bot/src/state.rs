//! Application state shared across flow handlers.

use std::sync::Arc;

use crate::config::BotConfig;
use crate::menu::MenuSource;
use crate::session::SessionStore;
use crate::store::{AddressBook, IdentityStore, OrderLedger};
use crate::telegram::Messenger;

/// Application state shared across all flow handlers.
///
/// Cheaply cloneable via `Arc`; the transport and menu source are trait
/// objects so tests can substitute scripted implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BotConfig,
    messenger: Arc<dyn Messenger>,
    menu: Arc<dyn MenuSource>,
    identity: IdentityStore,
    addresses: AddressBook,
    ledger: OrderLedger,
    sessions: SessionStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The store file paths come from the configuration; the files are
    /// created lazily on first write.
    #[must_use]
    pub fn new(config: BotConfig, messenger: Arc<dyn Messenger>, menu: Arc<dyn MenuSource>) -> Self {
        let identity = IdentityStore::new(config.users_file.clone());
        let addresses = AddressBook::new(config.addresses_file.clone());
        let ledger = OrderLedger::new(config.orders_file.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                messenger,
                menu,
                identity,
                addresses,
                ledger,
                sessions: SessionStore::new(),
            }),
        }
    }

    /// Get a reference to the bot configuration.
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    /// Get a reference to the messaging transport.
    #[must_use]
    pub fn messenger(&self) -> &dyn Messenger {
        self.inner.messenger.as_ref()
    }

    /// Get a reference to the menu source.
    #[must_use]
    pub fn menu(&self) -> &dyn MenuSource {
        self.inner.menu.as_ref()
    }

    /// Get a reference to the identity store.
    #[must_use]
    pub fn identity(&self) -> &IdentityStore {
        &self.inner.identity
    }

    /// Get a reference to the address catalog.
    #[must_use]
    pub fn addresses(&self) -> &AddressBook {
        &self.inner.addresses
    }

    /// Get a reference to the order ledger.
    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.inner.ledger
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}
