//! Client-credentials token acquisition against the identity provider.
//!
//! Quirks:
//! - Uses the OAuth 2.0 v2 token endpoint (`/{tenant}/oauth2/v2.0/token`).
//! - `grant_type=client_credentials` issues no refresh token; every call
//!   returns a fresh access token.
//! - Token lifetime is typically 1 hour; callers treat tokens as
//!   single-use and never cache them.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ApiError;

/// Access token returned by the identity provider's token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
}

/// Exchanges service-principal credentials for bearer access tokens
/// scoped to the database resource.
pub struct TokenProvider {
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    http: reqwest::Client,
}

impl TokenProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.token_scope.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Acquire a fresh access token. Single attempt, no caching.
    pub async fn acquire_token(&self) -> Result<AccessToken, ApiError> {
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::TokenExchange(format!("token request failed: {e}")))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::TokenExchange(format!(
                "identity provider rejected credentials: {body}"
            )));
        }

        let token: AccessToken = resp
            .json()
            .await
            .map_err(|e| ApiError::TokenExchange(format!("failed to parse token response: {e}")))?;

        Ok(token)
    }
}
