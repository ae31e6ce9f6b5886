//! Driven port for the persisted bearer token.
//!
//! The token lives under one well-known key in client-local storage. An absent
//! key means the console starts unauthenticated.

use super::define_port_error;

define_port_error! {
    /// Errors raised by token storage adapters.
    pub enum TokenStorageError {
        /// Underlying storage could not be read or written.
        Io { message: String } =>
            "token storage failed: {message}",
    }
}

/// Port for loading, saving, and removing the persisted token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStorage: Send + Sync {
    /// Load the raw stored token, or `None` when nothing is stored.
    fn load(&self) -> Result<Option<String>, TokenStorageError>;

    /// Replace the stored token.
    fn save(&self, token: &str) -> Result<(), TokenStorageError>;

    /// Remove the stored token. Removing an absent token succeeds.
    fn clear(&self) -> Result<(), TokenStorageError>;
}
