//! Session-scoped key/value storage.
//!
//! This module provides the storage capability the handshake is built on:
//! - [`SessionStorage`] - Trait for get/set/remove by key (enables mocking)
//! - [`MemoryStorage`] - In-process map, lives as long as the value does
//! - [`FileSessionStorage`] - One JSON file per session id
//!
//! Storage holds no logic. Every marker it carries is interpreted by the
//! [`crate::handshake`] components.

pub mod file;
pub mod keys;
pub mod memory;

pub use file::FileSessionStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// Trait for session-scoped key/value storage.
///
/// Implementations must be bound to a single session: nothing written here
/// may be visible to another session.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GuardError::StorageUnavailable`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GuardError::StorageUnavailable`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GuardError::StorageUnavailable`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads `key`, degrading a storage failure to "absent".
///
/// Every marker gates an approval, so an unreadable marker must behave like a
/// missing one.
pub(crate) fn read_or_absent(storage: &dyn SessionStorage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Session storage read failed, treating marker as absent");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;

    #[test]
    fn read_or_absent_returns_stored_value() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();

        assert_eq!(read_or_absent(&storage, "k"), Some("v".to_string()));
        assert_eq!(read_or_absent(&storage, "missing"), None);
    }

    #[test]
    fn read_or_absent_fails_closed() {
        let mut storage = MockSessionStorage::new();
        storage
            .expect_get()
            .returning(|_| Err(GuardError::StorageUnavailable("private mode".to_string())));

        assert_eq!(read_or_absent(&storage, keys::INTENT), None);
    }
}
