//! Secure Token Storage
//!
//! Persists the access and refresh tokens through the host's
//! [`SecureStore`] and keeps the current access token observable.
//!
//! ## Change notification
//!
//! Every component that needs the access token (the player, playlist
//! repositories) reads it from [`TokenStore::current_access_token`] at call
//! time. Components that react to sign-in or sign-out subscribe to a
//! `tokio::sync::watch` channel that is updated on every store, clear and
//! load.
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{AuthTokens, TokenStore};
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let token_store = TokenStore::new(secure_store);
//! let mut changes = token_store.subscribe();
//!
//! token_store
//!     .store(&AuthTokens::new("access", Some("refresh".to_string())))
//!     .await?;
//!
//! changes.changed().await.ok();
//! assert_eq!(changes.borrow().as_deref(), Some("access"));
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::AuthTokens;
use bridge_traits::storage::SecureStore;
use core_runtime::logging::mask_token;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Secure store key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Secure store key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Secure storage for the session tokens.
///
/// Token values are never logged; only a short fingerprint is.
#[derive(Clone)]
pub struct TokenStore {
    secure_store: Arc<dyn SecureStore>,
    current: Arc<watch::Sender<Option<String>>>,
}

impl TokenStore {
    /// Create a new token store. Call [`load`](Self::load) to pick up a token
    /// persisted by a previous run.
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        debug!("Initializing TokenStore");
        let (current, _) = watch::channel(None);
        Self {
            secure_store,
            current: Arc::new(current),
        }
    }

    /// Read the persisted access token into memory.
    ///
    /// A value that is not valid UTF-8 is treated as corrupted and deleted.
    pub async fn load(&self) -> Result<Option<String>> {
        let token = match self.read_secret(ACCESS_TOKEN_KEY).await? {
            Some(token) if !token.is_empty() => Some(token),
            _ => None,
        };

        self.publish(token.clone());
        debug!(has_token = token.is_some(), "Loaded access token");
        Ok(token)
    }

    /// The access token currently in memory.
    pub fn current_access_token(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn has_access_token(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Observe access token changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }

    /// Persist new tokens, replacing the previous ones.
    ///
    /// When `tokens` carries no refresh token the stored one is left as is.
    pub async fn store(&self, tokens: &AuthTokens) -> Result<()> {
        self.write_secret(ACCESS_TOKEN_KEY, tokens.access_token())
            .await?;

        if let Some(refresh) = tokens.refresh_token() {
            self.write_secret(REFRESH_TOKEN_KEY, refresh).await?;
        }

        self.publish(Some(tokens.access_token().to_string()));

        info!(
            token = %mask_token(tokens.access_token()),
            has_refresh_token = tokens.refresh_token().is_some(),
            "Tokens stored securely"
        );
        Ok(())
    }

    /// The persisted refresh token, if any.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.read_secret(REFRESH_TOKEN_KEY).await
    }

    /// Delete both tokens.
    pub async fn clear(&self) -> Result<()> {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            self.secure_store.delete_secret(key).await.map_err(|e| {
                warn!(key = key, error = %e, "Failed to delete token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;
        }

        self.publish(None);
        info!("Tokens cleared");
        Ok(())
    }

    fn publish(&self, token: Option<String>) {
        self.current.send_if_modified(|current| {
            if *current == token {
                false
            } else {
                *current = token;
                true
            }
        });
    }

    async fn write_secret(&self, key: &str, value: &str) -> Result<()> {
        self.secure_store
            .set_secret(key, value.as_bytes())
            .await
            .map_err(|e| {
                warn!(key = key, error = %e, "Failed to store token in secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })
    }

    async fn read_secret(&self, key: &str) -> Result<Option<String>> {
        let bytes = self
            .secure_store
            .get_secret(key)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))?;

        let Some(bytes) = bytes else {
            return Ok(None);
        };

        match String::from_utf8(bytes) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!(key = key, "Stored token is corrupted, deleting it");
                self.secure_store
                    .delete_secret(key)
                    .await
                    .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockSecureStore {
        storage: Mutex<HashMap<String, Vec<u8>>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
            if self.fail_writes {
                return Err(BridgeError::NotAvailable("keychain locked".to_string()));
            }
            self.storage
                .lock()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(self.storage.lock().await.get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            self.storage.lock().await.remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.storage.lock().await.keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.storage.lock().await.clear();
            Ok(())
        }
    }

    #[tokio::test]
    async fn store_then_clear_round_trip() {
        let secure = Arc::new(MockSecureStore::default());
        let store = TokenStore::new(secure.clone());

        store
            .store(&AuthTokens::new("access-1", Some("refresh-1".to_string())))
            .await
            .unwrap();

        assert_eq!(store.current_access_token().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("refresh-1"));
        assert_eq!(
            secure.get_secret(ACCESS_TOKEN_KEY).await.unwrap(),
            Some(b"access-1".to_vec())
        );

        store.clear().await.unwrap();
        assert!(!store.has_access_token());
        assert!(secure.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_picks_up_persisted_token() {
        let secure = Arc::new(MockSecureStore::default());
        secure
            .set_secret(ACCESS_TOKEN_KEY, b"persisted")
            .await
            .unwrap();

        let store = TokenStore::new(secure);
        assert!(store.current_access_token().is_none());

        assert_eq!(store.load().await.unwrap().as_deref(), Some("persisted"));
        assert_eq!(store.current_access_token().as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn corrupted_token_is_deleted() {
        let secure = Arc::new(MockSecureStore::default());
        secure
            .set_secret(ACCESS_TOKEN_KEY, &[0xff, 0xfe])
            .await
            .unwrap();

        let store = TokenStore::new(secure.clone());
        assert_eq!(store.load().await.unwrap(), None);
        assert_eq!(secure.get_secret(ACCESS_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let store = TokenStore::new(Arc::new(MockSecureStore::default()));
        let mut rx = store.subscribe();

        store.store(&AuthTokens::new("t1", None)).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_deref(), Some("t1"));

        store.clear().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), None);
    }

    #[tokio::test]
    async fn storage_failure_is_reported() {
        let store = TokenStore::new(Arc::new(MockSecureStore {
            fail_writes: true,
            ..Default::default()
        }));

        let err = store.store(&AuthTokens::new("t", None)).await.unwrap_err();
        assert!(matches!(err, AuthError::SecureStorageUnavailable(_)));
        assert!(!store.has_access_token());
    }
}
