//! Authenticated session: bearer token plus the logged-in user.
//!
//! The store is the only client state that survives a restart. When created
//! with [`SessionStore::persistent`] it mirrors itself to a JSON file which is
//! removed again on logout.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{ClientError, User};

#[derive(Clone, Debug)]
pub struct Session {
    pub token: SecretString,
    pub user: User,
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: User,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store, restoring a previous session if the file
    /// exists. An unreadable file is treated as "logged out".
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let restored = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<StoredSession>(&bytes) {
                Ok(stored) => Some(Session {
                    token: SecretString::new(stored.token.into()),
                    user: stored.user,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "ignoring corrupt session file: {e}");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read session file: {e}");
                None
            }
        };
        Self {
            current: RwLock::new(restored),
            path: Some(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Token for the next request, or `Unauthenticated` when logged out.
    pub async fn token(&self) -> Result<SecretString, ClientError> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or_else(|| ClientError::Unauthenticated("no active session".into()))
    }

    pub async fn set(&self, session: Session) -> Result<(), ClientError> {
        if let Some(path) = &self.path {
            let stored = StoredSession {
                token: session.token.expose_secret().to_string(),
                user: session.user.clone(),
            };
            let bytes = serde_json::to_vec_pretty(&stored)
                .map_err(|e| ClientError::Storage(e.to_string()))?;
            tokio::fs::write(path, bytes)
                .await
                .map_err(|e| ClientError::Storage(e.to_string()))?;
        }
        *self.current.write().await = Some(session);
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        *self.current.write().await = None;
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ClientError::Storage(e.to_string())),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn user() -> User {
        User {
            id: "1".into(),
            name: "Admin".into(),
            email: "admin@example.com".into(),
            role: Role::Admin,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn token_missing_when_logged_out() {
        let store = SessionStore::in_memory();
        let err = store.token().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthenticated(_)));
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn persistent_store_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");

        let store = SessionStore::persistent(&path);
        store
            .set(Session {
                token: SecretString::new("tok-1".into()),
                user: user(),
            })
            .await
            .expect("set");
        assert!(path.exists());

        let reopened = SessionStore::persistent(&path);
        let token = reopened.token().await.expect("restored token");
        assert_eq!(token.expose_secret(), "tok-1");
        assert_eq!(reopened.user().await.map(|u| u.role), Some(Role::Admin));

        reopened.clear().await.expect("clear");
        assert!(!path.exists());
        assert!(!reopened.is_authenticated().await);
    }

    #[tokio::test]
    async fn corrupt_file_means_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").expect("write");
        let store = SessionStore::persistent(&path);
        assert!(!store.is_authenticated().await);
    }
}
