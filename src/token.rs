//! Client-local persistent storage for the session token.
//!
//! The token is the only piece of session state that survives a restart.  It
//! lives in a single named entry; everything else about the user is re-read
//! from the server on every start.

use std::io::ErrorKind;
use std::sync::Mutex;

use utf8path::Path;

use crate::error::{Error, Result};

/// Name of the storage entry that holds the bearer token.
pub const TOKEN_ENTRY: &str = "jwt_token";

/// Storage for the bearer token.
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, if one exists and is non-empty.
    fn load(&self) -> Result<Option<String>>;

    /// Replaces the stored token.
    fn store(&self, token: &str) -> Result<()>;

    /// Deletes the stored token.  Deleting a missing token is not an error.
    fn clear(&self) -> Result<()>;
}

/// Keeps the token in a file named [`TOKEN_ENTRY`] inside a state directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: Path<'static>,
}

impl FileTokenStore {
    /// Creates a store for `<state_dir>/jwt_token`.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(TOKEN_ENTRY).into_owned(),
        }
    }

    /// The file holding the token.
    pub fn path(&self) -> &Path<'static> {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path.as_str()) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::io(
                format!("could not read token from {}", self.path.as_str()),
                err,
            )),
        }
    }

    fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = std::path::Path::new(self.path.as_str()).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(self.path.as_str(), token.trim()).map_err(|err| {
            Error::io(
                format!("could not write token to {}", self.path.as_str()),
                err,
            )
        })
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(self.path.as_str()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::io(
                format!("could not remove token at {}", self.path.as_str()),
                err,
            )),
        }
    }
}

/// Keeps the token in process memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let token = self.token.lock().unwrap_or_else(|e| e.into_inner());
        Ok(token.clone().filter(|t| !t.trim().is_empty()))
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut slot = self.token.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token.trim().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.token.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!(
            "safichat-token-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir.to_string_lossy().into_owned()
    }

    #[test]
    fn file_store_round_trip() {
        let dir = scratch_dir("round-trip");
        let store = FileTokenStore::new(&Path::from(dir.as_str()));
        assert_eq!(store.load().unwrap(), None);

        store.store("abc.def.ghi\n").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));
        assert!(store.path().as_str().ends_with(TOKEN_ENTRY));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_ignores_blank_token() {
        let dir = scratch_dir("blank");
        let store = FileTokenStore::new(&Path::from(dir.as_str()));
        store.store("   ").unwrap();
        assert_eq!(store.load().unwrap(), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn memory_store() {
        let store = MemoryTokenStore::with_token("t");
        assert_eq!(store.load().unwrap().as_deref(), Some("t"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.store("u").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("u"));
    }
}
