//! Sign-in handshake facade.
//!
//! Wires the intent tracker, state guard and callback validator over one
//! session's storage and exposes the two halves of the round trip:
//! [`SignInHandshake::begin`] before redirecting out and
//! [`SignInHandshake::complete`] when the browser comes back.

use std::sync::Arc;

use url::Url;

use crate::auth::ProviderClient;
use crate::config::SecurityConfig;
use crate::error::{GuardError, Result};
use crate::handshake::callback::CallbackParams;
use crate::handshake::intent::IntentTracker;
use crate::handshake::state_guard::StateGuard;
use crate::handshake::types::{HandshakePhase, ValidationResult};
use crate::handshake::validator::CallbackValidator;
use crate::storage::SessionStorage;

/// Outbound redirect produced by [`SignInHandshake::begin`].
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to send the browser to.
    pub url: Url,
    /// State token attached to `url`.
    pub state: String,
}

/// What the caller may do after a redirect came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Not a completion attempt. Keep showing the loading state.
    Pending,
    /// Approved. The code may be handed to the token exchange.
    Approved {
        /// Authorization code from the redirect.
        code: String,
    },
}

/// The full initiation to callback handshake for one session.
pub struct SignInHandshake {
    intent: IntentTracker,
    state_guard: StateGuard,
    validator: CallbackValidator,
}

impl SignInHandshake {
    /// Creates the handshake over `storage` with the given protection settings.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>, security: &SecurityConfig) -> Self {
        let intent =
            IntentTracker::new(Arc::clone(&storage)).with_max_age(security.intent_max_age());
        let state_guard = StateGuard::new(storage);

        let mut validator = CallbackValidator::new(intent.clone());
        if security.state_guard {
            validator = validator.with_state_guard(state_guard.clone());
        }

        Self {
            intent,
            state_guard,
            validator,
        }
    }

    /// Starts a sign-in: resets the session, records the intent and builds the
    /// authorization URL.
    ///
    /// Starting over is an explicit restart from idle, so any earlier approval
    /// in this session is revoked first.
    pub fn begin(&self, provider: &ProviderClient) -> Result<AuthorizationRequest> {
        self.reset()?;
        let state = self.state_guard.generate_state()?;
        self.intent.mark_initiated()?;

        let secret = state.secret().clone();
        let url = provider.authorize_url(state);
        tracing::info!("Sign-in started");

        Ok(AuthorizationRequest { url, state: secret })
    }

    /// Validates the redirect URL the browser came back with.
    ///
    /// # Errors
    ///
    /// Security rejections map to [`GuardError::ForgedCallback`],
    /// [`GuardError::StateMismatch`] or [`GuardError::StorageUnavailable`].
    /// An approved callback carrying an `error` parameter maps to
    /// [`GuardError::ProviderDenied`].
    pub fn complete(&self, callback_url: &Url) -> Result<Completion> {
        self.complete_with(&CallbackParams::from_url(callback_url))
    }

    /// Validates already-parsed callback parameters.
    ///
    /// Safe to call repeatedly for the same redirect.
    pub fn complete_with(&self, params: &CallbackParams) -> Result<Completion> {
        match self.validator.evaluate(params) {
            ValidationResult::Pending => Ok(Completion::Pending),
            ValidationResult::Rejected(reason) => {
                tracing::warn!(?reason, "Sign-in callback rejected");
                Err(reason.into())
            },
            ValidationResult::Approved => {
                if let Some(error) = &params.error {
                    return Err(GuardError::ProviderDenied {
                        error: error.clone(),
                        description: params.error_description.clone(),
                    });
                }
                Ok(params
                    .code
                    .clone()
                    .map_or(Completion::Pending, |code| Completion::Approved { code }))
            },
        }
    }

    /// Current durable phase of the handshake.
    pub fn phase(&self) -> HandshakePhase {
        if self.validator.already_validated() {
            HandshakePhase::Approved
        } else if self.intent.was_initiated() {
            HandshakePhase::IntentMarked
        } else {
            HandshakePhase::Idle
        }
    }

    /// Full reset back to idle: clears every marker and the state token.
    pub fn reset(&self) -> Result<()> {
        let intent = self.intent.clear_initiated();
        let state = self.state_guard.clear_stored_state();
        intent.and(state)
    }

    /// The intent tracker.
    pub const fn intent(&self) -> &IntentTracker {
        &self.intent
    }

    /// The state guard.
    pub const fn state_guard(&self) -> &StateGuard {
        &self.state_guard
    }

    /// The callback validator.
    pub const fn validator(&self) -> &CallbackValidator {
        &self.validator
    }
}
