//! Generic OAuth 2.0 / `OpenID` Connect client.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{IdentityError, IdentityProfile, IdentityProvider, IdentityTokens};
use crate::config::IdentityConfig;

/// Raw token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

/// OAuth client with configurable endpoints.
#[derive(Clone)]
pub struct OAuthClient {
    inner: Arc<OAuthClientInner>,
}

struct OAuthClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    authorize_url: String,
    token_url: String,
    userinfo_url: String,
    revoke_url: String,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.inner.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("authorize_url", &self.inner.authorize_url)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(OAuthClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                authorize_url: config.authorize_url.clone(),
                token_url: config.token_url.clone(),
                userinfo_url: config.userinfo_url.clone(),
                revoke_url: config.revoke_url.clone(),
            }),
        }
    }
}

#[async_trait]
impl IdentityProvider for OAuthClient {
    fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        format!(
            "{}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}&\
            nonce={}",
            self.inner.authorize_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<IdentityTokens, IdentityError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(&self.inner.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::OAuth(format!(
                "Token exchange failed: {text}"
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(IdentityTokens {
            access_token: token_response.access_token,
            id_token: token_response.id_token,
            refresh_token: token_response.refresh_token,
            expires_in: token_response.expires_in,
            obtained_at: chrono::Utc::now().timestamp(),
        })
    }

    #[instrument(skip_all)]
    async fn fetch_profile(&self, access_token: &str) -> Result<IdentityProfile, IdentityError> {
        let response = self
            .inner
            .client
            .get(&self.inner.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::OAuth(format!(
                "Userinfo request failed ({status}): {text}"
            )));
        }

        Ok(response.json().await?)
    }

    #[instrument(skip_all)]
    async fn revoke(&self, token: &str) -> Result<(), IdentityError> {
        let response = self
            .inner
            .client
            .post(&self.inner.revoke_url)
            .form(&[("token", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(IdentityError::OAuth(format!(
                "Token revocation failed ({status})"
            )));
        }

        Ok(())
    }
}
