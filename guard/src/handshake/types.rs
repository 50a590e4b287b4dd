//! Handshake result and phase types.

use std::fmt;

use crate::error::GuardError;

/// Why a callback was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No sign-in intent was recorded for this session.
    ForgedCallback,
    /// The echoed `state` parameter did not match the stored token.
    StateMismatch,
    /// The approval could not be recorded in session storage.
    StorageUnavailable,
}

/// Outcome of evaluating a redirect for a single sign-in attempt.
///
/// Moves forward only: `Pending` until a completion attempt arrives, then
/// `Approved` or `Rejected`. `Approved` stays approved for the rest of the
/// session. `Rejected` is terminal for the attempt and is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// The URL carries no `code` or `error`: not a completion attempt.
    Pending,
    /// The callback is legitimate and may be processed.
    Approved,
    /// The callback must not be processed.
    Rejected(RejectReason),
}

impl ValidationResult {
    /// Returns `true` only for [`ValidationResult::Approved`].
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl From<RejectReason> for GuardError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::ForgedCallback => Self::ForgedCallback,
            RejectReason::StateMismatch => Self::StateMismatch,
            RejectReason::StorageUnavailable => {
                Self::StorageUnavailable("the approved callback could not be recorded".to_string())
            },
        }
    }
}

/// Durable phase of the handshake, as recorded in session storage.
///
/// The transient `CallbackPending` and `Rejected` states of a single redirect
/// are reported through [`ValidationResult`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    /// No sign-in in progress.
    Idle,
    /// A sign-in was started and its callback has not been approved yet.
    IntentMarked,
    /// A callback was approved. Absorbing until reset.
    Approved,
}

impl fmt::Display for HandshakePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::IntentMarked => write!(f, "waiting for callback"),
            Self::Approved => write!(f, "approved"),
        }
    }
}
