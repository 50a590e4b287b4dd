//! Sign-in handshake state machine.
//!
//! Protects the initiation to callback round trip of an OAuth/OIDC sign-in:
//! - [`IntentTracker`] - Records that this application started the sign-in
//! - [`CallbackValidator`] - Approves a callback exactly once per session
//! - [`StateGuard`] - Single-use CSRF `state` parameter comparison
//! - [`SignInHandshake`] - All three wired over one session's storage
//!
//! `Idle -> IntentMarked -> (redirect) -> CallbackPending -> Approved | Rejected`.
//! `Approved` holds for the rest of the session. `Rejected` ends the attempt.

pub mod callback;
pub mod flow;
pub mod intent;
pub mod state_guard;
pub mod types;
pub mod validator;

pub use callback::CallbackParams;
pub use flow::{AuthorizationRequest, Completion, SignInHandshake};
pub use intent::IntentTracker;
pub use state_guard::StateGuard;
pub use types::{HandshakePhase, RejectReason, ValidationResult};
pub use validator::CallbackValidator;
