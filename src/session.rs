//! The session context handed to every outbound call.

use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::token::TokenStore;
use crate::types::UserInfo;

/// Token access plus the identity learned from the last successful validation.
///
/// The token is re-read from the [`TokenStore`] on every call so that a logout
/// in one place is seen everywhere.  The user is held in memory only.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    user: Arc<RwLock<Option<UserInfo>>>,
}

impl Session {
    /// Creates a session backed by `store`.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            user: Arc::new(RwLock::new(None)),
        }
    }

    /// The current token, or `None` when logged out.
    pub fn token(&self) -> Result<Option<String>> {
        self.store.load()
    }

    /// The current token, or an authentication error when logged out.
    pub fn bearer(&self) -> Result<String> {
        self.token()?
            .ok_or_else(|| Error::authentication("Not authenticated. Please login."))
    }

    /// Stores a freshly issued token.
    pub fn set_token(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(Error::validation("empty token", Some("access_token".to_string())));
        }
        self.store.store(token)
    }

    /// Discards the token and forgets the user.
    pub fn discard(&self) -> Result<()> {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.store.clear()
    }

    /// Records the validated user.
    pub fn set_user(&self, user: UserInfo) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user);
    }

    /// The validated user, if any.
    pub fn user(&self) -> Option<UserInfo> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The validated user's identifier, if any.
    pub fn user_id(&self) -> Option<u64> {
        self.user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|u| u.id)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;

    #[test]
    fn bearer_requires_token() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        assert!(session.bearer().unwrap_err().is_authentication());
        session.set_token("abc").unwrap();
        assert_eq!(session.bearer().unwrap(), "abc");
    }

    #[test]
    fn empty_token_is_rejected() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        assert!(session.set_token("  ").unwrap_err().is_validation());
    }

    #[test]
    fn discard_forgets_user_and_token() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("abc")));
        session.set_user(UserInfo::new(9, "esi"));
        assert_eq!(session.user_id(), Some(9));
        session.discard().unwrap();
        assert_eq!(session.user_id(), None);
        assert_eq!(session.token().unwrap(), None);
    }

    #[test]
    fn clones_share_state() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("abc")));
        let other = session.clone();
        session.set_user(UserInfo::new(1, "a"));
        assert_eq!(other.user().map(|u| u.username), Some("a".to_string()));
    }
}
