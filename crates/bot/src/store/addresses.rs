//! Shared delivery address catalog.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::instrument;

use super::StoreError;

/// Persisted layout of the address catalog.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AddressesFile {
    addresses: Vec<String>,
}

/// Ordered catalog of delivery address strings.
///
/// Addresses are appended by an administrator and copied by value into
/// profiles at registration; the catalog itself never deletes in-band.
#[derive(Debug)]
pub struct AddressBook {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AddressBook {
    /// Create a catalog over the given file path.
    ///
    /// A missing file reads as an empty catalog.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<AddressesFile, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::Data(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AddressesFile::default()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// All addresses, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or decoded.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.addresses)
    }

    /// Append one address to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be read or written.
    #[instrument(skip(self))]
    pub async fn append(&self, address: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load()?;
        file.addresses.push(address.to_string());
        let raw = serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::Data(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_then_append_preserves_order() {
        let dir = TempDir::new().unwrap();
        let book = AddressBook::new(dir.path().join("addresses.json"));

        assert!(book.list().await.unwrap().is_empty());

        book.append("Main St 1").await.unwrap();
        book.append("Oak Ave 5").await.unwrap();
        assert_eq!(
            book.list().await.unwrap(),
            vec!["Main St 1".to_string(), "Oak Ave 5".to_string()]
        );
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let dir = TempDir::new().unwrap();
        let book = AddressBook::new(dir.path().join("addresses.json"));
        book.append("Main St 1").await.unwrap();
        book.append("Main St 1").await.unwrap();
        assert_eq!(book.list().await.unwrap().len(), 2);
    }
}
