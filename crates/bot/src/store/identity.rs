//! Identity store: durable phone-to-profile mapping.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::instrument;

use lunchroom_core::{ChatId, PhoneNumber, Role};

use super::StoreError;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Canonical phone key; immutable once created.
    pub phone: PhoneNumber,
    /// Permission level.
    pub role: Role,
    /// Delivery address, copied by value from the catalog at registration
    /// time (a later catalog edit does not follow the profile).
    pub address: String,
    /// Display name.
    pub name: String,
    /// Linked messaging channel, if the user has ever connected.
    #[serde(default)]
    pub chat_id: Option<ChatId>,
}

/// Persisted layout of the users file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersFile {
    users: Vec<UserProfile>,
}

/// Durable mapping from phone number to user profile.
///
/// Backed by a JSON file read fully and rewritten fully on every mutation;
/// the mutex serializes those cycles.
#[derive(Debug)]
pub struct IdentityStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl IdentityStore {
    /// Create a store over the given file path.
    ///
    /// The file is created lazily on first write; a missing file reads as
    /// an empty store.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<UsersFile, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::Data(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(UsersFile::default()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn persist(&self, file: &UsersFile) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(file)
            .map_err(|e| StoreError::Data(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Look up a profile by canonical phone key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or decoded.
    pub async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<UserProfile>, StoreError> {
        let _guard = self.lock.lock().await;
        let file = self.load()?;
        Ok(file.users.into_iter().find(|user| &user.phone == phone))
    }

    /// Look up a profile by linked chat id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or decoded.
    pub async fn find_by_chat(&self, chat: ChatId) -> Result<Option<UserProfile>, StoreError> {
        let _guard = self.lock.lock().await;
        let file = self.load()?;
        Ok(file.users.into_iter().find(|user| user.chat_id == Some(chat)))
    }

    /// Persist a newly registered profile.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the phone key is already
    /// registered; a phone maps to at most one profile.
    #[instrument(skip(self, profile), fields(phone = %profile.phone))]
    pub async fn insert(&self, profile: UserProfile) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load()?;
        if file.users.iter().any(|user| user.phone == profile.phone) {
            return Err(StoreError::Conflict(format!(
                "phone already registered: {}",
                profile.phone
            )));
        }
        file.users.push(profile);
        self.persist(&file)
    }

    /// Link a chat id to an existing profile (reconnection from a new
    /// device, or a profile imported without a channel).
    ///
    /// A phone with no profile is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or written.
    pub async fn link_chat(&self, phone: &PhoneNumber, chat: ChatId) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load()?;
        let mut changed = false;
        for user in &mut file.users {
            if &user.phone == phone && user.chat_id != Some(chat) {
                user.chat_id = Some(chat);
                changed = true;
            }
        }
        if changed {
            self.persist(&file)?;
        }
        Ok(())
    }

    /// All profiles, in registration order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or decoded.
    pub async fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.users)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> IdentityStore {
        IdentityStore::new(dir.path().join("users.json"))
    }

    fn profile(phone: &str, name: &str, chat: Option<i64>) -> UserProfile {
        UserProfile {
            phone: PhoneNumber::normalize(phone),
            role: Role::Customer,
            address: "Main St 1".to_string(),
            name: name.to_string(),
            chat_id: chat.map(ChatId::new),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.list().await.unwrap().is_empty());
        assert!(
            store
                .find_by_phone(&PhoneNumber::normalize("79160000000"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.insert(profile("+79160000000", "Ann", Some(42))).await.unwrap();

        let by_phone = store
            .find_by_phone(&PhoneNumber::normalize("8 916 000 00 00"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_phone.name, "Ann");

        let by_chat = store.find_by_chat(ChatId::new(42)).await.unwrap().unwrap();
        assert_eq!(by_chat.name, "Ann");
        assert!(store.find_by_chat(ChatId::new(7)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_conflicts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.insert(profile("+79160000000", "Ann", None)).await.unwrap();

        let result = store.insert(profile("8 916 000 00 00", "Bob", None)).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_link_chat() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let phone = PhoneNumber::normalize("+79160000000");
        store.insert(profile("+79160000000", "Ann", None)).await.unwrap();

        store.link_chat(&phone, ChatId::new(99)).await.unwrap();
        let found = store.find_by_chat(ChatId::new(99)).await.unwrap().unwrap();
        assert_eq!(found.phone, phone);

        // Unknown phone is a no-op.
        store
            .link_chat(&PhoneNumber::normalize("79990000000"), ChatId::new(1))
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_data_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "not json").unwrap();
        let store = IdentityStore::new(path);
        assert!(matches!(store.list().await, Err(StoreError::Data(_))));
    }
}
