//! Storage keys for handshake markers.
//!
//! These must stay stable across a release. Renaming one orphans every
//! sign-in that is in flight while the new version rolls out.

/// Intent Marker: RFC 3339 timestamp of the last sign-in this session started.
pub const INTENT: &str = "signin_guard.intent";

/// Validated-Once Marker: present once this session approved a callback.
pub const VALIDATED: &str = "signin_guard.validated";

/// Outstanding CSRF state token.
pub const STATE_TOKEN: &str = "signin_guard.state";

/// Cached outcome (`"true"`/`"false"`) of the first state comparison.
pub const STATE_OUTCOME: &str = "signin_guard.state_outcome";

/// Encoded value of the Validated-Once Marker.
pub(crate) const FLAG_SET: &str = "true";

/// Every key the handshake writes.
pub const ALL: [&str; 4] = [INTENT, VALIDATED, STATE_TOKEN, STATE_OUTCOME];
