//! Token store: the persisted copy of the bearer token and the signed-in user.
//!
//! The token is opaque and never inspected. The user record is stored as JSON
//! in the session field layout of [`User`].

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use super::storage::{ClientStorage, StorageError};
use crate::net::types::User;

pub const TOKEN_KEY: &str = "portal.token";
pub const USER_KEY: &str = "portal.user";

#[derive(Clone, Debug)]
pub struct TokenStore<S> {
    storage: S,
}

impl<S: ClientStorage> TokenStore<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the token.
    pub fn save(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, token)
    }

    /// The stored token. An empty entry counts as absent.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    /// # Errors
    ///
    /// Returns an error if the user cannot be encoded or persisted.
    pub fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.storage.set(USER_KEY, &raw)
    }

    /// Persist a new session. The user is written before the token; if the
    /// token write fails the previous user entry is put back, so a failed
    /// save leaves the prior session intact.
    ///
    /// # Errors
    ///
    /// Returns the first write failure.
    pub fn save_session(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let previous_user = self.storage.get(USER_KEY);
        self.save_user(user)?;
        if let Err(error) = self.save(token) {
            let rollback = match previous_user {
                Some(raw) => self.storage.set(USER_KEY, &raw),
                None => self.storage.remove(USER_KEY),
            };
            if let Err(rollback_error) = rollback {
                tracing::warn!(error = %rollback_error, "failed to restore previous cached user");
            }
            return Err(error);
        }
        Ok(())
    }

    /// The cached user, or `None` if missing or unparseable.
    #[must_use]
    pub fn read_user(&self) -> Option<User> {
        let raw = self.storage.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::warn!(%error, "discarding unparseable cached user");
                None
            }
        }
    }

    /// Remove both entries. Both removals are attempted; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist a removal.
    pub fn clear(&self) -> Result<(), StorageError> {
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        token.and(user)
    }
}
