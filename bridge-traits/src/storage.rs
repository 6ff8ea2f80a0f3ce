//! Secure storage for the session tokens.
//!
//! `core-auth` keeps `accessToken` and `refreshToken` here so a restarted host
//! comes back signed in.

use async_trait::async_trait;

use crate::error::Result;

/// Host-provided secret store: the OS keychain on desktop and mobile, an
/// encrypted storage shim on the web.
///
/// Implementations must never log stored values.
///
/// ```ignore
/// async fn remember(store: &dyn SecureStore, token: &str) -> Result<()> {
///     store.set_secret("accessToken", token.as_bytes()).await
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Replaces any previous value under `key`.
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// `Ok(None)` when nothing is stored under `key`.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Deleting a missing key is not an error.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }

    /// Keys only, never values.
    async fn list_keys(&self) -> Result<Vec<String>>;

    async fn clear_all(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl SecureStore for MemoryStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> Result<Vec<String>> {
            Ok(self.entries.lock().unwrap().keys().cloned().collect())
        }

        async fn clear_all(&self) -> Result<()> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }
    }

    #[tokio::test]
    async fn has_secret_default_uses_get_secret() {
        let store = MemoryStore::default();
        assert!(!store.has_secret("accessToken").await.unwrap());

        store.set_secret("accessToken", b"abc").await.unwrap();
        assert!(store.has_secret("accessToken").await.unwrap());

        store.delete_secret("accessToken").await.unwrap();
        assert!(!store.has_secret("accessToken").await.unwrap());
    }
}
