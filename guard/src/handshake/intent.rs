//! Sign-in intent tracking.
//!
//! The intent marker records that this application, and not an
//! attacker-crafted link, started the sign-in. It is written right before
//! redirecting to the identity provider and consumed when the callback is
//! approved.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::storage::{keys, read_or_absent, SessionStorage};

/// Records and queries the sign-in intent marker.
#[derive(Clone)]
pub struct IntentTracker {
    storage: Arc<dyn SessionStorage>,
    max_age: Option<Duration>,
}

impl IntentTracker {
    /// Creates a tracker whose markers never expire.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            max_age: None,
        }
    }

    /// Treats markers older than `max_age` as absent. `None` disables expiry.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Writes a fresh intent marker, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GuardError::StorageUnavailable`] if the marker
    /// cannot be written. The callback will then be rejected.
    pub fn mark_initiated(&self) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.storage.set(keys::INTENT, &now)?;
        tracing::debug!(at = %now, "Sign-in intent marked");
        Ok(())
    }

    /// Returns `true` if a live intent marker is present.
    pub fn was_initiated(&self) -> bool {
        self.initiated_at().is_some()
    }

    /// When the live intent marker was written.
    ///
    /// Unreadable, unparseable and expired markers all read as `None`.
    pub fn initiated_at(&self) -> Option<DateTime<Utc>> {
        let raw = read_or_absent(self.storage.as_ref(), keys::INTENT)?;

        let Ok(marked_at) = DateTime::parse_from_rfc3339(&raw) else {
            tracing::warn!(value = %raw, "Malformed sign-in intent marker, treating as absent");
            return None;
        };
        let marked_at = marked_at.with_timezone(&Utc);

        if let Some(max_age) = self.max_age {
            // A marker dated in the future has age zero.
            if let Ok(age) = (Utc::now() - marked_at).to_std() {
                if age > max_age {
                    tracing::debug!(age_secs = age.as_secs(), "Sign-in intent marker expired");
                    return None;
                }
            }
        }

        Some(marked_at)
    }

    /// Removes the intent marker and the validated-once marker.
    ///
    /// Used for logout and full reset. Both removals are attempted even if
    /// the first one fails.
    pub fn clear_initiated(&self) -> Result<()> {
        let intent = self.storage.remove(keys::INTENT);
        let validated = self.storage.remove(keys::VALIDATED);
        tracing::debug!("Sign-in intent cleared");
        intent.and(validated)
    }

    /// Deletes the intent marker, ending the current attempt.
    pub(crate) fn consume(&self) -> Result<()> {
        self.storage.remove(keys::INTENT)
    }

    pub(crate) fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }
}
