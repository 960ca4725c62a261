//! Session-token storage.
//!
//! The session is a single opaque bearer token. It lives behind the
//! [`SessionStore`] capability so the client can be wired to an in-process
//! slot in tests and to an on-disk slot in the CLI, and so clearing it on
//! expiry stays a one-line operation for the response interceptor.

use std::path::PathBuf;
use std::sync::Mutex;

/// Get/set/clear access to the stored session token.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: String);
    fn clear(&self);
}

/// Process-wide in-memory token slot.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_token(&self, token: String) {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token);
    }

    fn clear(&self) {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

/// Token slot persisted as a single file, so a login survives across CLI
/// invocations. Storage failures are logged and treated as an absent token
/// rather than surfaced; the store is an opaque slot, not a database.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location under the platform config directory.
    #[must_use]
    pub fn default_path() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("atomchat").join("token")))
    }

    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(_) => None,
        }
    }

    fn set_token(&self, token: String) {
        if let Some(parent) = self.path.parent()
            && let Err(error) = std::fs::create_dir_all(parent)
        {
            tracing::warn!(%error, path = %self.path.display(), "failed to create session dir");
            return;
        }
        if let Err(error) = std::fs::write(&self.path, token) {
            tracing::warn!(%error, path = %self.path.display(), "failed to persist session token");
        }
    }

    fn clear(&self) {
        if let Err(error) = std::fs::remove_file(&self.path)
            && error.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(%error, path = %self.path.display(), "failed to remove session token");
        }
    }
}
