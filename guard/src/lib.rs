//! Signin Guard - sign-in handshake protection for OAuth/OIDC redirects.
//!
//! Marks that a sign-in was deliberately started by the application, rejects
//! forged redirect callbacks, and validates each callback exactly once even
//! when the host runs its callback handling more than once.

pub mod auth;
pub mod config;
pub mod error;
pub mod handshake;
pub mod storage;

pub use error::{GuardError, Result};
pub use handshake::{
    CallbackParams, CallbackValidator, Completion, HandshakePhase, IntentTracker, SignInHandshake,
    StateGuard, ValidationResult,
};
pub use storage::{FileSessionStorage, MemoryStorage, SessionStorage};
