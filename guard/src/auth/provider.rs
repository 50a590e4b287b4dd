//! OAuth provider client configuration.

use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenUrl};
use url::Url;

use crate::config::ProviderConfig;
use crate::error::{GuardError, Result};

/// OAuth client for the configured identity provider.
pub struct ProviderClient {
    client: BasicClient,
    scopes: Vec<Scope>,
}

impl ProviderClient {
    /// Build the client from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Config`] if the client ID or an endpoint is missing.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GuardError::Config("provider.client_id is not set".to_string()))?;
        let auth_url = config
            .auth_url
            .clone()
            .ok_or_else(|| GuardError::Config("provider.auth_url is not set".to_string()))?;
        let token_url = config
            .token_url
            .clone()
            .ok_or_else(|| GuardError::Config("provider.token_url is not set".to_string()))?;

        let client = BasicClient::new(
            ClientId::new(client_id.to_string()),
            config.client_secret.clone().map(ClientSecret::new),
            AuthUrl::from_url(auth_url),
            Some(TokenUrl::from_url(token_url)),
        )
        .set_redirect_uri(RedirectUrl::from_url(config.redirect_url.clone()));

        Ok(Self {
            client,
            scopes: config.scopes.iter().cloned().map(Scope::new).collect(),
        })
    }

    /// Build the outbound authorization URL carrying `state`.
    #[must_use]
    pub fn authorize_url(&self, state: CsrfToken) -> Url {
        let (url, _) = self
            .client
            .authorize_url(|| state)
            .add_scopes(self.scopes.iter().cloned())
            .url();
        url
    }

    pub(crate) const fn client(&self) -> &BasicClient {
        &self.client
    }
}
