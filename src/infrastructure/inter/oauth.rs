use super::error_details;
use crate::config::Credentials;
use crate::domain::ports::Authenticator;
use crate::domain::token::AccessToken;
use crate::error::AuthError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const TOKEN_PATH: &str = "/oauth/v2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Client-credentials grant against the bank's OAuth endpoint.
pub struct OAuthAuthenticator {
    client: Client,
    token_url: String,
    credentials: Credentials,
}

impl OAuthAuthenticator {
    pub fn new(client: Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            client,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            credentials,
        }
    }
}

#[async_trait]
impl Authenticator for OAuthAuthenticator {
    async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        let client_id = self
            .credentials
            .client_id
            .as_deref()
            .ok_or(AuthError::MissingCredentials("CLIENT_ID"))?;
        let client_secret = self
            .credentials
            .client_secret
            .as_deref()
            .ok_or(AuthError::MissingCredentials("CLIENT_SECRET"))?;

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", self.credentials.scope.as_str()),
        ];

        let response = self.client.post(&self.token_url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                details: error_details(response).await,
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        if body.access_token.is_empty() {
            return Err(AuthError::MalformedResponse(
                "empty access_token".to_string(),
            ));
        }

        debug!(expires_in = ?body.expires_in, "access token obtained");
        Ok(AccessToken::new(
            body.access_token,
            body.expires_in.map(Duration::from_secs),
        ))
    }
}
