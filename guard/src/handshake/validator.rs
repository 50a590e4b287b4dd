//! Exactly-once callback validation.
//!
//! Hosts may run their callback setup code more than once for the same
//! redirect. The first approval writes the validated-once marker, and every
//! later evaluation in the session short-circuits to approval instead of
//! finding the intent marker already consumed and rejecting.

use std::sync::Arc;

use crate::handshake::callback::CallbackParams;
use crate::handshake::intent::IntentTracker;
use crate::handshake::state_guard::StateGuard;
use crate::handshake::types::{RejectReason, ValidationResult};
use crate::storage::{keys, read_or_absent, SessionStorage};

/// Decides whether a redirect callback may be processed.
#[derive(Clone)]
pub struct CallbackValidator {
    storage: Arc<dyn SessionStorage>,
    intent: IntentTracker,
    state_guard: Option<StateGuard>,
}

impl CallbackValidator {
    /// Creates a validator that checks the intent marker only.
    #[must_use]
    pub fn new(intent: IntentTracker) -> Self {
        Self {
            storage: Arc::clone(intent.storage()),
            intent,
            state_guard: None,
        }
    }

    /// Also requires the echoed `state` parameter to match.
    #[must_use]
    pub fn with_state_guard(mut self, guard: StateGuard) -> Self {
        self.state_guard = Some(guard);
        self
    }

    /// Validates the callback and consumes the intent marker on approval.
    ///
    /// Idempotent within a session: once a callback has been approved, every
    /// later call returns `true` without reading the intent marker or the
    /// parameters again.
    pub fn validate_and_consume(&self, params: &CallbackParams) -> bool {
        self.decide(params).is_approved()
    }

    /// Evaluates a redirect, leaving storage untouched for bare navigations.
    ///
    /// A URL without `code` or `error` is not a completion attempt and yields
    /// [`ValidationResult::Pending`].
    pub fn evaluate(&self, params: &CallbackParams) -> ValidationResult {
        if !params.is_completion_attempt() {
            return ValidationResult::Pending;
        }
        self.decide(params)
    }

    /// Returns `true` if this session already approved a callback.
    pub fn already_validated(&self) -> bool {
        read_or_absent(self.storage.as_ref(), keys::VALIDATED).is_some()
    }

    fn decide(&self, params: &CallbackParams) -> ValidationResult {
        if self.already_validated() {
            tracing::debug!("Callback already validated in this session");
            return ValidationResult::Approved;
        }

        if !self.intent.was_initiated() {
            tracing::warn!("Callback arrived without a sign-in started by this session");
            return ValidationResult::Rejected(RejectReason::ForgedCallback);
        }

        if let Some(guard) = &self.state_guard {
            if !Self::check_state(guard, params.state.as_deref()) {
                return ValidationResult::Rejected(RejectReason::StateMismatch);
            }
        }

        if let Err(e) = self.storage.set(keys::VALIDATED, keys::FLAG_SET) {
            tracing::warn!(error = %e, "Failed to record callback approval");
            self.abandon_attempt();
            return ValidationResult::Rejected(RejectReason::StorageUnavailable);
        }

        if let Some(guard) = &self.state_guard {
            if let Err(e) = guard.cache_outcome(true) {
                tracing::warn!(error = %e, "Failed to cache CSRF state outcome");
            }
        }

        // The validated-once marker already short-circuits later calls.
        if let Err(e) = self.intent.consume() {
            tracing::warn!(error = %e, "Failed to delete sign-in intent marker");
        }

        tracing::info!("Sign-in callback approved");
        ValidationResult::Approved
    }

    /// Consumes the state token without caching a match.
    ///
    /// Only an approved callback may leave a positive outcome behind, and an
    /// approved callback never gets this far. Any cached outcome found here
    /// belongs to a spent token.
    fn check_state(guard: &StateGuard, received: Option<&str>) -> bool {
        if guard.cached_outcome().is_some() {
            tracing::warn!("CSRF state token already spent in this session");
            return false;
        }

        let matched = guard.take_and_compare(received);
        if !matched {
            if let Err(e) = guard.cache_outcome(false) {
                tracing::warn!(error = %e, "Failed to cache CSRF state outcome");
            }
        }
        matched
    }

    /// Makes a rejection after the state check terminal for this attempt.
    fn abandon_attempt(&self) {
        if let Some(guard) = &self.state_guard {
            if let Err(e) = guard.cache_outcome(false) {
                tracing::warn!(error = %e, "Failed to cache CSRF state outcome");
            }
        }
        if let Err(e) = self.intent.consume() {
            tracing::warn!(error = %e, "Failed to delete sign-in intent marker");
        }
    }
}
