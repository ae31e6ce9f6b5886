//! Session context shared by every component that talks to the backend.
//!
//! One [`SessionContext`] is built at application root and passed by `Arc`
//! to the bootstrapper, the admin API and the list views. It owns the
//! [`CredentialStore`] and the [`ResourceFetcher`] used for authorized calls.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::domain::Credential;
use crate::domain::ports::{ResourceFetcher, TokenStorage, TokenStorageError};

/// Holder of the bearer credential.
///
/// The in-memory copy is authoritative for the running process; the storage
/// port mirrors it so the session survives restarts. Storage failures on
/// clear are logged and never keep a rejected credential alive in memory.
pub struct CredentialStore {
    current: RwLock<Option<Credential>>,
    storage: Arc<dyn TokenStorage>,
}

impl CredentialStore {
    /// Build a store seeded from persisted storage.
    ///
    /// A missing, blank, or malformed stored token leaves the store empty.
    pub fn restore(storage: Arc<dyn TokenStorage>) -> Self {
        let current = match storage.load() {
            Ok(Some(raw)) => match Credential::new(&raw) {
                Ok(credential) => Some(credential),
                Err(error) => {
                    warn!(%error, "ignoring unusable stored token");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "token storage unreadable; starting unauthenticated");
                None
            }
        };
        debug!(present = current.is_some(), "credential store restored");
        Self {
            current: RwLock::new(current),
            storage,
        }
    }

    /// Current credential, if any.
    pub fn get(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a credential is present.
    pub fn is_present(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Persist and adopt a new credential.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the token cannot be persisted; the
    /// in-memory credential is left unchanged in that case.
    pub fn set(&self, credential: Credential) -> Result<(), TokenStorageError> {
        self.storage.save(credential.expose())?;
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);
        info!("credential stored");
        Ok(())
    }

    /// Drop the credential from memory and storage.
    pub fn clear(&self) {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Err(error) = self.storage.clear() {
            warn!(%error, "failed to remove persisted token");
        }
        info!("credential cleared");
    }
}

/// Explicit session context threaded through the console.
pub struct SessionContext {
    credentials: CredentialStore,
    fetcher: Arc<dyn ResourceFetcher>,
}

impl SessionContext {
    /// Bundle a credential store with the fetcher used for authorized calls.
    pub fn new(credentials: CredentialStore, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            credentials,
            fetcher,
        }
    }

    /// Credential store for this session.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Fetcher for authorized backend calls.
    pub fn fetcher(&self) -> &Arc<dyn ResourceFetcher> {
        &self.fetcher
    }

    /// End the session.
    pub fn logout(&self) {
        self.credentials.clear();
    }
}
