//! Token storage in the OS credential vault (Keychain, Credential Manager,
//! Secret Service).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use tracing::{debug, warn};

const DEFAULT_SERVICE: &str = "tunestream";

/// [`SecureStore`] backed by the `keyring` crate.
///
/// Values are base64-encoded because vault entries hold strings. Vaults
/// cannot be enumerated, so [`list_keys`](SecureStore::list_keys) and
/// [`clear_all`](SecureStore::clear_all) only see keys this process has
/// written or found.
pub struct KeyringSecureStore {
    service: String,
    seen: Mutex<BTreeSet<String>>,
}

impl KeyringSecureStore {
    pub fn new() -> Self {
        Self::with_service_name(DEFAULT_SERVICE)
    }

    /// Entries are namespaced by `service`; use a distinct one per app.
    pub fn with_service_name(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            seen: Mutex::new(BTreeSet::new()),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).map_err(vault_error)
    }

    /// Raw entry text, `None` when the vault has no such entry.
    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(text) => {
                self.seen.lock().insert(key.to_string());
                Ok(Some(text))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(vault_error(e)),
        }
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

fn vault_error(e: keyring::Error) -> BridgeError {
    BridgeError::OperationFailed(format!("Credential vault error: {}", e))
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entry(key)?
            .set_password(&STANDARD.encode(value))
            .map_err(vault_error)?;
        self.seen.lock().insert(key.to_string());
        debug!(service = %self.service, key, "Secret saved");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(text) = self.read(key)? else {
            debug!(key, "No secret stored");
            return Ok(None);
        };
        STANDARD.decode(text.as_bytes()).map(Some).map_err(|e| {
            warn!(key, error = %e, "Stored secret is not valid base64");
            BridgeError::OperationFailed(format!("Corrupt secret '{}': {}", key, e))
        })
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(vault_error(e)),
        }
        self.seen.lock().remove(key);
        debug!(key, "Secret removed");
        Ok(())
    }

    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.read(key)?.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.seen.lock().iter().cloned().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        let keys: Vec<String> = self.seen.lock().iter().cloned().collect();
        for key in &keys {
            self.delete_secret(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_store_knows_no_keys() {
        let store = KeyringSecureStore::new();
        assert_eq!(store.service, "tunestream");
        assert!(store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_round_trip_when_vault_available() {
        // CI containers rarely run a secret service; skip there.
        let store = KeyringSecureStore::with_service_name("tunestream-test");
        let key = "accessToken";

        if let Err(e) = store.set_secret(key, b"eyJ.token").await {
            println!("Credential vault unavailable ({}), skipping", e);
            return;
        }

        assert_eq!(store.list_keys().await.unwrap(), vec![key.to_string()]);
        if let Ok(Some(value)) = store.get_secret(key).await {
            assert_eq!(value, b"eyJ.token".to_vec());
        }
        store.clear_all().await.unwrap();
        assert!(store.list_keys().await.unwrap().is_empty());
    }
}
