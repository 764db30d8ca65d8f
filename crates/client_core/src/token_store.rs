//! Durable single-slot persistence for the bearer token.
//!
//! The whole persisted surface of the client is one value: the token, kept
//! in a small JSON document on disk and re-validated against the service
//! before it is trusted at startup.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// File name of the durable slot inside the data directory.
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    token: Option<String>,
}

pub trait TokenStore {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON-file-backed [`TokenStore`].
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform data directory slot, falling back to `./data` when the
    /// platform reports none.
    pub fn default_path(app_name: &str) -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("./data"))
            .join(app_name)
            .join(SESSION_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file '{}'", self.path.display()))?;
        // A corrupt slot is treated as empty rather than blocking startup.
        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(persisted) => Ok(persisted.token),
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "discarding unreadable session file");
                Ok(None)
            }
        }
    }

    fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create session directory '{}'", parent.display())
            })?;
        }
        let persisted = PersistedSession {
            token: Some(token.to_string()),
        };
        let raw = serde_json::to_string_pretty(&persisted)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write session file '{}'", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("failed to remove session file '{}'", self.path.display())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_token_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join(SESSION_FILE));

        assert!(store.load().unwrap().is_none());

        store.store("tok-123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-123"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing an already-empty slot is fine.
        store.clear().unwrap();
    }

    #[test]
    fn unreadable_slot_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        fs::write(&path, "{ not json").unwrap();

        let store = FileTokenStore::new(path);
        assert!(store.load().unwrap().is_none());
    }
}
