// Trusted-token store: trust on first use, exact match afterwards

pub mod backend;

pub use backend::{MemoryStorage, StorageBackend};

use crate::error::GateError;
use crate::fingerprint::FingerprintToken;
use std::sync::Arc;

/// Result of checking a freshly computed token against the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustOutcome {
    /// Slot was empty; the token has just been stored as the trusted one.
    FirstUse,
    /// Slot holds exactly this token.
    Matched,
    /// Slot holds a different token.
    Mismatch,
    /// Slot was empty but the token was not admitted; nothing stored.
    NotAdmitted,
}

impl TrustOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::FirstUse | Self::Matched)
    }
}

/// Single trusted-token slot under a fixed storage key.
///
/// Read-then-write is not atomic: two tabs evaluating on first use can race
/// and the later write wins.
pub struct FingerprintStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
}

impl FingerprintStore {
    pub fn new(backend: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Currently trusted token, if any.
    pub fn load(&self) -> Result<Option<FingerprintToken>, GateError> {
        let stored = self.backend.get(&self.key).map_err(GateError::Storage)?;
        Ok(stored
            .filter(|s| !s.is_empty())
            .map(FingerprintToken::from_stored))
    }

    /// Clear the trusted token so the next visit starts over.
    pub fn clear(&self) -> Result<(), GateError> {
        self.backend.remove(&self.key).map_err(GateError::Storage)
    }

    /// Trust-on-first-use check.
    pub fn evaluate(&self, current: &FingerprintToken) -> Result<TrustOutcome, GateError> {
        self.evaluate_with(current, |_| true)
    }

    /// Like [`evaluate`](Self::evaluate), but a first-seen token is only
    /// stored when `admit` accepts it.
    pub fn evaluate_with(
        &self,
        current: &FingerprintToken,
        admit: impl FnOnce(&FingerprintToken) -> bool,
    ) -> Result<TrustOutcome, GateError> {
        match self.load()? {
            Some(stored) if stored == *current => Ok(TrustOutcome::Matched),
            Some(stored) => {
                tracing::info!(
                    "Device token {} does not match trusted {}",
                    current.short_id(),
                    stored.short_id()
                );
                Ok(TrustOutcome::Mismatch)
            }
            None if admit(current) => {
                self.backend
                    .put(&self.key, current.as_str())
                    .map_err(GateError::Storage)?;
                tracing::info!("Trusting first-seen device {}", current.short_id());
                Ok(TrustOutcome::FirstUse)
            }
            None => Ok(TrustOutcome::NotAdmitted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FailingStorage;

    const KEY: &str = "deviceFingerprint";

    fn token(s: &str) -> FingerprintToken {
        FingerprintToken::from_stored(s)
    }

    #[test]
    fn test_first_use_stores_token() {
        let storage = MemoryStorage::new();
        let store = FingerprintStore::new(Arc::new(storage.clone()), KEY);

        assert_eq!(store.evaluate(&token("abc")).unwrap(), TrustOutcome::FirstUse);
        assert_eq!(storage.get(KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_matching_token_leaves_slot_unchanged() {
        let storage = MemoryStorage::with_entry(KEY, "abc");
        let store = FingerprintStore::new(Arc::new(storage.clone()), KEY);

        let outcome = store.evaluate(&token("abc")).unwrap();
        assert_eq!(outcome, TrustOutcome::Matched);
        assert!(outcome.is_granted());
        assert_eq!(storage.get(KEY).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_mismatch_denies_and_keeps_trusted() {
        let storage = MemoryStorage::with_entry(KEY, "abc");
        let store = FingerprintStore::new(Arc::new(storage.clone()), KEY);

        let outcome = store.evaluate(&token("xyz")).unwrap();
        assert_eq!(outcome, TrustOutcome::Mismatch);
        assert!(!outcome.is_granted());
        assert_eq!(storage.get(KEY).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_second_device_after_first_use_is_rejected() {
        let store = FingerprintStore::new(Arc::new(MemoryStorage::new()), KEY);
        assert!(store.evaluate(&token("phone-a")).unwrap().is_granted());
        assert!(!store.evaluate(&token("phone-b")).unwrap().is_granted());
        assert!(store.evaluate(&token("phone-a")).unwrap().is_granted());
    }

    #[test]
    fn test_empty_string_counts_as_absent() {
        let storage = MemoryStorage::with_entry(KEY, "");
        let store = FingerprintStore::new(Arc::new(storage.clone()), KEY);
        assert_eq!(store.evaluate(&token("abc")).unwrap(), TrustOutcome::FirstUse);
    }

    #[test]
    fn test_not_admitted_stores_nothing() {
        let storage = MemoryStorage::new();
        let store = FingerprintStore::new(Arc::new(storage.clone()), KEY);
        let outcome = store.evaluate_with(&token("abc"), |_| false).unwrap();
        assert_eq!(outcome, TrustOutcome::NotAdmitted);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clear_resets_slot() {
        let storage = MemoryStorage::with_entry(KEY, "abc");
        let store = FingerprintStore::new(Arc::new(storage.clone()), KEY);
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_backend_errors_surface() {
        let store = FingerprintStore::new(Arc::new(FailingStorage), KEY);
        assert!(matches!(store.evaluate(&token("abc")), Err(GateError::Storage(_))));
    }
}
