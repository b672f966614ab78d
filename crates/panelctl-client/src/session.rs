//! Session token store.
//!
//! Holds the opaque bearer token for the active session and persists it
//! across process restarts. The token is never inspected; an absent token
//! is the valid `anonymous` state, not an error. Shared behind an `Arc`
//! between the gateway (reads) and the orchestrator (login/logout/401).

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::warn;

use panelctl_core::error::{Error, Result};

#[derive(Serialize, Deserialize)]
struct PersistedSession {
    token: String,
}

/// Durable store for the current session token.
#[derive(Debug)]
pub struct SessionStore {
    token: Mutex<Option<String>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Create a store, initializing from `path` when a persisted token
    /// exists. An unreadable or malformed file degrades to anonymous.
    pub fn new(path: Option<PathBuf>) -> Self {
        let token = path.as_deref().and_then(|p| {
            let content = std::fs::read_to_string(p).ok()?;
            match serde_json::from_str::<PersistedSession>(&content) {
                Ok(s) => Some(s.token),
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "ignoring malformed session file");
                    None
                }
            }
        });
        Self {
            token: Mutex::new(token),
            path,
        }
    }

    /// In-memory store with no persistence (tests, one-shot use).
    pub fn ephemeral() -> Self {
        Self::new(None)
    }

    fn guard(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current token and persist it.
    pub fn set_token(&self, token: &str) -> Result<()> {
        *self.guard() = Some(token.to_string());
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::Session(format!("create {}: {e}", parent.display())))?;
            }
            let body = serde_json::to_string(&PersistedSession {
                token: token.to_string(),
            })?;
            std::fs::write(path, body)
                .map_err(|e| Error::Session(format!("write {}: {e}", path.display())))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o600);
                std::fs::set_permissions(path, perms)
                    .map_err(|e| Error::Session(format!("chmod {}: {e}", path.display())))?;
            }
        }
        Ok(())
    }

    /// Current token, if any. Never an error.
    pub fn token(&self) -> Option<String> {
        self.guard().clone()
    }

    /// Drop the token and remove the persisted copy.
    pub fn clear(&self) -> Result<()> {
        *self.guard() = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::Session(format!("remove {}: {e}", path.display())));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_anonymous_without_file() {
        let store = SessionStore::ephemeral();
        assert_eq!(store.token(), None);
    }

    #[test]
    fn token_round_trips_across_reconstruction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::new(Some(path.clone()));
        store.set_token("tok-abc").unwrap();
        drop(store);

        let store = SessionStore::new(Some(path));
        assert_eq!(store.token(), Some("tok-abc".to_string()));
    }

    #[test]
    fn clear_removes_persisted_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::new(Some(path.clone()));
        store.set_token("tok-abc").unwrap();
        store.clear().unwrap();
        assert_eq!(store.token(), None);
        assert!(!path.exists());

        let store = SessionStore::new(Some(path));
        assert_eq!(store.token(), None);
    }

    #[test]
    fn clear_on_anonymous_store_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(Some(dir.path().join("session.json")));
        store.clear().unwrap();
    }

    #[test]
    fn malformed_session_file_degrades_to_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = SessionStore::new(Some(path));
        assert_eq!(store.token(), None);
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_readable_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::new(Some(path.clone()));
        store.set_token("tok").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
