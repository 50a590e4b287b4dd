//! Application configuration settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::paths;
use crate::error::Result;

/// Main configuration for signin-guard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Identity provider settings.
    pub provider: ProviderConfig,
    /// Handshake protection settings.
    pub security: SecurityConfig,
    /// Session storage settings.
    pub session: SessionConfig,
}

/// Identity provider (OAuth/OIDC) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// OAuth client ID.
    pub client_id: Option<String>,
    /// OAuth client secret (confidential clients only).
    pub client_secret: Option<String>,
    /// Authorization endpoint.
    #[serde(with = "url_serde::option")]
    pub auth_url: Option<Url>,
    /// Token endpoint.
    #[serde(with = "url_serde::option")]
    pub token_url: Option<Url>,
    /// Where the provider sends the browser back to.
    #[serde(with = "url_serde")]
    pub redirect_url: Url,
    /// Requested scopes.
    pub scopes: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            auth_url: None,
            token_url: None,
            redirect_url: Url::parse("http://localhost:8765/callback")
                .expect("valid default URL"),
            scopes: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
        }
    }
}

/// Handshake protection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Require the echoed `state` parameter to match.
    pub state_guard: bool,
    /// Maximum age of a sign-in intent marker in seconds. `0` disables expiry.
    pub intent_max_age_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            state_guard: true,
            intent_max_age_secs: 600,
        }
    }
}

impl SecurityConfig {
    /// Maximum intent marker age, or `None` if markers never expire.
    #[must_use]
    pub const fn intent_max_age(&self) -> Option<Duration> {
        match self.intent_max_age_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Session storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding session files. Defaults to the data directory.
    pub dir: Option<PathBuf>,
}

impl SessionConfig {
    /// The directory session files live in.
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::sessions_dir(),
        }
    }
}

/// Custom serde module for URL serialization.
mod url_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use url::Url;

    pub fn serialize<S>(url: &Url, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(url.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Url, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Url::parse(&s).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use serde::{self, Deserialize, Deserializer, Serializer};
        use url::Url;

        pub fn serialize<S>(url: &Option<Url>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match url {
                Some(url) => serializer.serialize_some(url.as_str()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| Url::parse(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// Environment variables that can override configuration.
pub mod env {
    pub const CLIENT_ID: &str = "SIGNIN_GUARD_CLIENT_ID";
    pub const REDIRECT_URL: &str = "SIGNIN_GUARD_REDIRECT_URL";
    pub const SESSION_DIR: &str = "SIGNIN_GUARD_SESSION_DIR";
    pub const SESSION: &str = "SIGNIN_GUARD_SESSION";
    pub const LOG_LEVEL: &str = "SIGNIN_GUARD_LOG";
}

impl GuardConfig {
    /// Apply environment variable overrides to the configuration.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(client_id) = std::env::var(env::CLIENT_ID) {
            if !client_id.is_empty() {
                self.provider.client_id = Some(client_id);
            }
        }

        if let Ok(url) = std::env::var(env::REDIRECT_URL) {
            if let Ok(parsed) = Url::parse(&url) {
                self.provider.redirect_url = parsed;
            }
        }

        if let Ok(dir) = std::env::var(env::SESSION_DIR) {
            if !dir.is_empty() {
                self.session.dir = Some(PathBuf::from(dir));
            }
        }

        self
    }
}
