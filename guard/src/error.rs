//! Error types and result aliases for signin-guard.
//!
//! This module provides the error taxonomy for the sign-in handshake:
//! - Security rejections that terminate the current sign-in attempt
//! - Pass-through failures from the identity provider
//! - Configuration and serialization failures of the host application
//!
//! Security rejections are never retriable. Retrying a failed forgery check
//! automatically would itself be an attack vector.

use thiserror::Error;

/// Main error type for signin-guard operations.
///
/// Each variant includes a user-facing message. Use
/// [`is_security_rejection`](Self::is_security_rejection) to decide whether
/// the UI must show the blocking security error page.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Callback parameters arrived without a matching sign-in intent.
    #[error("This sign-in was not started by this application and has been blocked. Return to home and try again.")]
    ForgedCallback,

    /// The `state` parameter echoed by the provider does not match the one sent.
    #[error("The sign-in response does not match the request this application sent and has been blocked. Return to home and try again.")]
    StateMismatch,

    /// Session storage threw or is disabled (e.g. private browsing mode).
    #[error("Session storage is unavailable ({0}), so the sign-in cannot be verified. Return to home and try again.")]
    StorageUnavailable(String),

    /// The identity provider redirected back with an `error` parameter.
    #[error("The identity provider refused the sign-in: {error}{}. Return to home and try again.", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    ProviderDenied {
        /// OAuth error code (e.g. `access_denied`).
        error: String,
        /// Optional human-readable description from the provider.
        description: Option<String>,
    },

    /// The identity provider could not be reached.
    #[error("Identity provider is unavailable: {0}. Check your network connection or try again later.")]
    ProviderUnavailable(String),

    /// Authorization code exchange failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// General configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}. Check file permissions and format.")]
    ConfigRead(String),

    /// Failed to write configuration file.
    #[error("Failed to write configuration file: {0}. Check directory permissions.")]
    ConfigWrite(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON or TOML serialization/deserialization failed.
    #[error("Data serialization error: {0}. This may indicate corrupted data.")]
    Serialization(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl GuardError {
    /// Checks if this error is a security rejection of the callback.
    ///
    /// These must be surfaced to the user as a blocking error and are terminal
    /// for the current sign-in attempt.
    #[must_use]
    pub const fn is_security_rejection(&self) -> bool {
        matches!(
            self,
            Self::ForgedCallback | Self::StateMismatch | Self::StorageUnavailable(_)
        )
    }

    /// Checks if this error is transient and the operation might succeed on retry.
    ///
    /// Only identity provider connectivity qualifies. Security rejections never do.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }
}

/// Result type alias using [`GuardError`].
pub type Result<T> = std::result::Result<T, GuardError>;

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for GuardError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigRead(format!("TOML parse error: {err}"))
    }
}

impl From<toml::ser::Error> for GuardError {
    fn from(err: toml::ser::Error) -> Self {
        Self::ConfigWrite(format!("TOML serialize error: {err}"))
    }
}
