//! CSRF `state` parameter guard.
//!
//! Generates an unpredictable token before redirecting out and compares it,
//! exactly once, against the value the identity provider echoes back. The
//! first comparison's outcome is cached so repeated evaluation of the same
//! redirect keeps answering the same way after the token is gone.

use std::sync::Arc;

use oauth2::CsrfToken;

use crate::error::Result;
use crate::storage::{keys, read_or_absent, SessionStorage};

/// Random bytes per generated token (base64url encoded on the wire).
const STATE_TOKEN_BYTES: u32 = 32;

const OUTCOME_MATCH: &str = "true";
const OUTCOME_MISMATCH: &str = "false";

/// Single-use CSRF state token guard.
#[derive(Clone)]
pub struct StateGuard {
    storage: Arc<dyn SessionStorage>,
}

impl StateGuard {
    /// Creates a guard over the session's storage.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Generates and stores a fresh state token for the outbound redirect.
    ///
    /// Any cached outcome from a previous redirect is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GuardError::StorageUnavailable`] if the token
    /// cannot be stored.
    pub fn generate_state(&self) -> Result<CsrfToken> {
        let token = CsrfToken::new_random_len(STATE_TOKEN_BYTES);
        self.storage.remove(keys::STATE_OUTCOME)?;
        self.storage.set(keys::STATE_TOKEN, token.secret())?;
        tracing::debug!("CSRF state token generated");
        Ok(token)
    }

    /// Compares `received` against the stored token, once.
    ///
    /// The first call after a redirect consumes the stored token and caches
    /// the outcome. Later calls return the cached outcome. An absent
    /// `received` token is always a rejection. Comparison is exact.
    pub fn validate_state(&self, received: Option<&str>) -> bool {
        if let Some(cached) = self.cached_outcome() {
            return cached && received.is_some();
        }

        let matched = self.take_and_compare(received);
        if let Err(e) = self.cache_outcome(matched) {
            // An uncached match would read as a mismatch on the next call.
            tracing::warn!(error = %e, "Failed to cache CSRF state outcome");
            return false;
        }
        matched
    }

    /// Returns `true` if a token is waiting for its callback.
    pub fn is_outstanding(&self) -> bool {
        read_or_absent(self.storage.as_ref(), keys::STATE_TOKEN).is_some()
    }

    /// Removes the token and the cached outcome.
    pub fn clear_stored_state(&self) -> Result<()> {
        let token = self.storage.remove(keys::STATE_TOKEN);
        let outcome = self.storage.remove(keys::STATE_OUTCOME);
        token.and(outcome)
    }

    /// Outcome of the first comparison since the last [`Self::generate_state`].
    pub(crate) fn cached_outcome(&self) -> Option<bool> {
        read_or_absent(self.storage.as_ref(), keys::STATE_OUTCOME).map(|v| v == OUTCOME_MATCH)
    }

    /// Compares `received` against the stored token and deletes the token.
    ///
    /// Records nothing. The caller decides when the outcome is cached.
    pub(crate) fn take_and_compare(&self, received: Option<&str>) -> bool {
        let stored = read_or_absent(self.storage.as_ref(), keys::STATE_TOKEN);
        let matched = match (stored.as_deref(), received) {
            (Some(stored), Some(received)) => stored == received,
            (None, _) => {
                tracing::warn!("No outstanding CSRF state token for this session");
                false
            },
            (Some(_), None) => {
                tracing::warn!("Callback carried no state parameter");
                false
            },
        };

        if let Err(e) = self.storage.remove(keys::STATE_TOKEN) {
            tracing::warn!(error = %e, "Failed to delete CSRF state token");
        }
        if !matched {
            tracing::warn!("CSRF state token mismatch");
        }
        matched
    }

    pub(crate) fn cache_outcome(&self, matched: bool) -> Result<()> {
        let outcome = if matched {
            OUTCOME_MATCH
        } else {
            OUTCOME_MISMATCH
        };
        self.storage.set(keys::STATE_OUTCOME, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;
    use crate::storage::{MemoryStorage, MockSessionStorage};

    fn guard() -> (Arc<MemoryStorage>, StateGuard) {
        let storage = Arc::new(MemoryStorage::new());
        (storage.clone(), StateGuard::new(storage))
    }

    #[test]
    fn generated_tokens_are_unpredictable() {
        let (_, guard) = guard();
        let first = guard.generate_state().unwrap();
        let second = guard.generate_state().unwrap();

        assert_ne!(first.secret(), second.secret());
        assert!(first.secret().len() >= 43);
    }

    #[test]
    fn generate_stores_token() {
        let (storage, guard) = guard();
        let token = guard.generate_state().unwrap();

        assert_eq!(storage.get(keys::STATE_TOKEN).unwrap().as_ref(), Some(token.secret()));
        assert!(guard.is_outstanding());
    }

    #[test]
    fn matching_token_is_single_use_with_cached_outcome() {
        let (storage, guard) = guard();
        let token = guard.generate_state().unwrap();

        assert!(guard.validate_state(Some(token.secret())));
        assert!(storage.get(keys::STATE_TOKEN).unwrap().is_none());

        // Token is gone, the cached outcome answers.
        assert!(guard.validate_state(Some(token.secret())));
    }

    #[test]
    fn mismatch_rejects_and_removes_token() {
        let (storage, guard) = guard();
        let token = guard.generate_state().unwrap();

        assert!(!guard.validate_state(Some("other")));
        assert!(storage.get(keys::STATE_TOKEN).unwrap().is_none());

        // The real token cannot be replayed after a failed comparison.
        assert!(!guard.validate_state(Some(token.secret())));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let (_, guard) = guard();
        let token = guard.generate_state().unwrap();
        let flipped: String = token
            .secret()
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect();

        if flipped != *token.secret() {
            assert!(!guard.validate_state(Some(&flipped)));
        }
    }

    #[test]
    fn absent_received_token_is_rejected() {
        let (storage, guard) = guard();
        let token = guard.generate_state().unwrap();

        assert!(!guard.validate_state(None));
        assert!(storage.get(keys::STATE_TOKEN).unwrap().is_none());
        assert!(!guard.validate_state(Some(token.secret())));
    }

    #[test]
    fn absent_received_token_is_rejected_after_cached_match() {
        let (_, guard) = guard();
        let token = guard.generate_state().unwrap();

        assert!(guard.validate_state(Some(token.secret())));
        assert!(!guard.validate_state(None));
    }

    #[test]
    fn missing_stored_token_is_rejected() {
        let (_, guard) = guard();
        assert!(!guard.validate_state(Some("anything")));
    }

    #[test]
    fn generate_discards_previous_outcome() {
        let (_, guard) = guard();
        guard.generate_state().unwrap();
        assert!(!guard.validate_state(Some("wrong")));

        let token = guard.generate_state().unwrap();
        assert!(guard.validate_state(Some(token.secret())));
    }

    #[test]
    fn clear_removes_token_and_outcome() {
        let (storage, guard) = guard();
        let token = guard.generate_state().unwrap();
        guard.validate_state(Some(token.secret()));
        guard.generate_state().unwrap();

        guard.clear_stored_state().unwrap();

        assert!(storage.is_empty());
        assert!(!guard.is_outstanding());
    }

    #[test]
    fn uncacheable_match_fails_closed() {
        let mut storage = MockSessionStorage::new();
        storage.expect_get().returning(|key| {
            if key == keys::STATE_TOKEN {
                Ok(Some("token".to_string()))
            } else {
                Ok(None)
            }
        });
        storage.expect_remove().returning(|_| Ok(()));
        storage
            .expect_set()
            .returning(|_, _| Err(GuardError::StorageUnavailable("quota".to_string())));

        let guard = StateGuard::new(Arc::new(storage));
        assert!(!guard.validate_state(Some("token")));
    }
}
