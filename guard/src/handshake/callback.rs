//! Redirect callback parameters.

use std::borrow::Cow;

use url::Url;

/// Query parameters the identity provider appends to the redirect URL.
///
/// When a parameter is repeated, the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code.
    pub code: Option<String>,
    /// OAuth error code (e.g. `access_denied`).
    pub error: Option<String>,
    /// Human-readable error description.
    pub error_description: Option<String>,
    /// Echoed CSRF state token.
    pub state: Option<String>,
}

impl CallbackParams {
    /// Extracts the parameters from a full redirect URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// Extracts the parameters from a raw query string, with or without `?`.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn from_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut params = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_ref() {
                "code" => &mut params.code,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                "state" => &mut params.state,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Returns `true` if the redirect is a completion attempt.
    ///
    /// Only presence matters: an empty `code=` still counts.
    #[must_use]
    pub const fn is_completion_attempt(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }
}
