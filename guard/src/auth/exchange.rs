//! Authorization code exchange.
//!
//! Only called after the handshake approved the callback. Failures here are
//! identity provider failures, not security rejections, and pass straight
//! through to the caller.

use chrono::Utc;
use oauth2::basic::BasicTokenType;
use oauth2::reqwest::async_http_client;
use oauth2::{AuthorizationCode, RequestTokenError, TokenResponse};

use crate::auth::provider::ProviderClient;
use crate::auth::tokens::TokenSet;
use crate::error::{GuardError, Result};

/// Exchange an approved authorization code for tokens.
///
/// # Errors
///
/// Returns [`GuardError::ProviderUnavailable`] if the token endpoint cannot be
/// reached and [`GuardError::AuthenticationFailed`] if it refuses the code.
pub async fn exchange_code(provider: &ProviderClient, code: &str) -> Result<TokenSet> {
    let token_response = provider
        .client()
        .exchange_code(AuthorizationCode::new(code.to_string()))
        .request_async(async_http_client)
        .await
        .map_err(|e| match e {
            RequestTokenError::Request(err) => GuardError::ProviderUnavailable(err.to_string()),
            RequestTokenError::ServerResponse(response) => {
                GuardError::AuthenticationFailed(format!("Token endpoint refused the code: {response}"))
            },
            other => GuardError::AuthenticationFailed(format!("Token exchange failed: {other}")),
        })?;

    // Calculate expiration time
    let expires_at = token_response.expires_in().map(|duration| {
        Utc::now() + chrono::Duration::from_std(duration).unwrap_or_default()
    });

    let token_type = match token_response.token_type() {
        BasicTokenType::Bearer => "Bearer".to_string(),
        BasicTokenType::Mac => "MAC".to_string(),
        BasicTokenType::Extension(other) => other.clone(),
    };

    tracing::info!(token_type = %token_type, "Authorization code exchanged");

    Ok(TokenSet {
        access_token: token_response.access_token().secret().to_string(),
        refresh_token: token_response.refresh_token().map(|t| t.secret().to_string()),
        token_type,
        expires_at,
        scope: token_response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> ProviderClient {
        let config = ProviderConfig {
            client_id: Some("my-app".to_string()),
            auth_url: Some(Url::parse(&format!("{}/authorize", server.uri())).unwrap()),
            token_url: Some(Url::parse(&format!("{}/token", server.uri())).unwrap()),
            ..ProviderConfig::default()
        };
        ProviderClient::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn exchanges_code_for_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-123",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-456",
                "scope": "openid profile"
            })))
            .mount(&server)
            .await;

        let tokens = exchange_code(&provider(&server), "abc").await.unwrap();

        assert_eq!(tokens.access_token, "access-123");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh-456"));
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.scope.as_deref(), Some("openid profile"));
        assert!(!tokens.is_expired());
    }

    #[tokio::test]
    async fn refused_code_is_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "code already used"
            })))
            .mount(&server)
            .await;

        let err = exchange_code(&provider(&server), "abc").await.unwrap_err();

        assert!(matches!(err, GuardError::AuthenticationFailed(_)));
        assert!(err.to_string().contains("invalid_grant"));
        assert!(!err.is_security_rejection());
    }
}
