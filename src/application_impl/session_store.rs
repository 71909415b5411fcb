use crate::domain_model::*;
use crate::domain_port::{KeyValueStore, StorageError};
use std::sync::Arc;
use tracing::{debug, warn};

pub const ACCESS_KEY: &str = "access";
pub const REFRESH_KEY: &str = "refresh";
pub const USER_KEY: &str = "user";

/// Current access/refresh token pair and cached profile, persisted in three
/// fixed key/value slots.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Returns whatever is stored; unreadable slots read as empty.
    pub async fn get(&self) -> Session {
        let access_token = self.read(ACCESS_KEY).await.map(AccessToken);
        let refresh_token = self.read(REFRESH_KEY).await.map(RefreshToken);
        let user = match self.read(USER_KEY).await {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("discarding corrupt cached user: {e}");
                    None
                }
            },
            None => None,
        };

        Session {
            access_token,
            refresh_token,
            user,
        }
    }

    /// Persists a new token pair. A `None` user drops the cached profile,
    /// which belonged to the previous tokens.
    pub async fn set(
        &self,
        access: AccessToken,
        refresh: RefreshToken,
        user: Option<User>,
    ) -> Result<(), StorageError> {
        self.replace(&Session {
            access_token: Some(access),
            refresh_token: Some(refresh),
            user,
        })
        .await
    }

    pub async fn set_user(&self, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user).map_err(|e| StorageError::Format(e.to_string()))?;
        self.storage.set(USER_KEY, &raw).await
    }

    pub async fn access_token(&self) -> Option<AccessToken> {
        self.read(ACCESS_KEY).await.map(AccessToken)
    }

    pub async fn phase(&self) -> SessionPhase {
        self.get().await.phase()
    }

    /// Removes all three slots. Never fails; storage errors are logged.
    pub async fn clear(&self) {
        for key in [ACCESS_KEY, REFRESH_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                warn!("failed to clear session slot {key}: {e}");
            }
        }
        debug!("session cleared");
    }

    /// Writes a whole session. If any slot fails to write, the previous
    /// snapshot is restored so no half-written session is left behind.
    pub(crate) async fn replace(&self, session: &Session) -> Result<(), StorageError> {
        let previous = self.get().await;
        match self.write_all(session).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("session write failed, restoring previous session: {e}");
                if let Err(restore) = self.write_all(&previous).await {
                    warn!("failed to restore previous session: {restore}");
                }
                Err(e)
            }
        }
    }

    async fn write_all(&self, session: &Session) -> Result<(), StorageError> {
        self.write_slot(ACCESS_KEY, session.access_token.as_ref().map(|t| t.0.clone()))
            .await?;
        self.write_slot(REFRESH_KEY, session.refresh_token.as_ref().map(|t| t.0.clone()))
            .await?;
        let user = match &session.user {
            Some(user) => Some(
                serde_json::to_string(user).map_err(|e| StorageError::Format(e.to_string()))?,
            ),
            None => None,
        };
        self.write_slot(USER_KEY, user).await
    }

    async fn write_slot(&self, key: &str, value: Option<String>) -> Result<(), StorageError> {
        match value {
            Some(value) => self.storage.set(key, &value).await,
            None => self.storage.remove(key).await,
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("failed to read session slot {key}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::MockKeyValueStore;
    use crate::infra_memory::MemoryKeyValueStore;

    fn jane() -> User {
        User {
            id: UserId::new("2"),
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            mobile: "+1234567891".to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn never_set_reads_empty() {
        let store = SessionStore::new(Arc::new(MemoryKeyValueStore::new()));
        let session = store.get().await;
        assert!(session.is_empty());
        assert_eq!(session.phase(), SessionPhase::Anonymous);
    }

    #[tokio::test]
    async fn set_then_clear() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = SessionStore::new(storage.clone());

        store
            .set(
                AccessToken("a".to_string()),
                RefreshToken("r".to_string()),
                None,
            )
            .await
            .unwrap();
        assert_eq!(store.phase().await, SessionPhase::Authenticating);

        store.set_user(&jane()).await.unwrap();
        let session = store.get().await;
        assert_eq!(session.phase(), SessionPhase::Authenticated);
        assert_eq!(session.user, Some(jane()));
        assert_eq!(storage.get(ACCESS_KEY).await.unwrap().as_deref(), Some("a"));

        store.clear().await;
        store.clear().await;
        assert!(store.get().await.is_empty());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn new_tokens_drop_stale_user() {
        let store = SessionStore::new(Arc::new(MemoryKeyValueStore::new()));
        store
            .set(
                AccessToken("a".to_string()),
                RefreshToken("r".to_string()),
                Some(jane()),
            )
            .await
            .unwrap();
        store
            .set(
                AccessToken("b".to_string()),
                RefreshToken("s".to_string()),
                None,
            )
            .await
            .unwrap();
        assert_eq!(store.get().await.user, None);
    }

    #[tokio::test]
    async fn corrupt_user_reads_as_absent() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        storage.set(ACCESS_KEY, "a").await.unwrap();
        storage.set(USER_KEY, "{not json").await.unwrap();
        let session = SessionStore::new(storage).get().await;
        assert_eq!(session.access_token, Some(AccessToken("a".to_string())));
        assert_eq!(session.user, None);
    }

    #[tokio::test]
    async fn clear_swallows_storage_errors() {
        let mut storage = MockKeyValueStore::new();
        storage
            .expect_remove()
            .times(3)
            .returning(|_| Err(StorageError::Io("disk gone".to_string())));
        let store = SessionStore::new(Arc::new(storage));
        store.clear().await;
    }

    #[tokio::test]
    async fn failed_write_restores_previous_session() {
        let mut storage = MockKeyValueStore::new();
        // previous session: access "old", nothing else
        storage.expect_get().returning(|key| {
            Ok(match key {
                ACCESS_KEY => Some("old".to_string()),
                _ => None,
            })
        });
        let writes = Arc::new(std::sync::Mutex::new(Vec::<(String, String)>::new()));
        let recorded = writes.clone();
        storage.expect_set().returning(move |key, value| {
            if key == REFRESH_KEY {
                return Err(StorageError::Io("quota exceeded".to_string()));
            }
            recorded
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_string()));
            Ok(())
        });
        storage.expect_remove().returning(|_| Ok(()));

        let store = SessionStore::new(Arc::new(storage));
        let result = store
            .set(
                AccessToken("new".to_string()),
                RefreshToken("r".to_string()),
                Some(jane()),
            )
            .await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        let writes = writes.lock().unwrap();
        assert_eq!(
            writes.as_slice(),
            &[
                (ACCESS_KEY.to_string(), "new".to_string()),
                (ACCESS_KEY.to_string(), "old".to_string()),
            ]
        );
    }
}
