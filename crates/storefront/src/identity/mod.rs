//! External identity provider.
//!
//! Visitors sign in with an OAuth 2.0 / `OpenID` Connect provider using the
//! authorization-code flow:
//!
//! 1. Build the authorization URL with `authorization_url()`
//! 2. Redirect the visitor to the provider's consent page
//! 3. The provider redirects back with an authorization code
//! 4. Exchange the code for tokens with `exchange_code()`
//! 5. Check the ID token's `nonce` claim with `id_token_nonce()`
//! 6. Fetch the profile with `fetch_profile()`
//!
//! Sign-out revokes the access token with `revoke()`.

mod oauth;

pub use oauth::OAuthClient;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// Errors from the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// The profile lacks a usable email address.
    #[error("Profile has no valid email")]
    MissingEmail,
}

/// Tokens obtained via the authorization-code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityTokens {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

/// Profile claims returned by the userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityProfile {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// An OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to redirect the visitor to for sign-in.
    fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<IdentityTokens, IdentityError>;

    /// Fetch the signed-in user's profile.
    async fn fetch_profile(&self, access_token: &str) -> Result<IdentityProfile, IdentityError>;

    /// Revoke a token at the provider.
    async fn revoke(&self, token: &str) -> Result<(), IdentityError>;
}

/// Read the `nonce` claim of an ID token.
///
/// The token must come straight from the provider's token endpoint; its
/// signature is not checked.
///
/// # Errors
///
/// Returns `IdentityError::OAuth` if the token is not a decodable JWT.
pub fn id_token_nonce(id_token: &str) -> Result<Option<String>, IdentityError> {
    #[derive(Deserialize)]
    struct Claims {
        nonce: Option<String>,
    }

    let malformed = || IdentityError::OAuth("malformed id_token".to_string());
    let payload = id_token.split('.').nth(1).ok_or_else(malformed)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| malformed())?;
    let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| malformed())?;
    Ok(claims.nonce)
}
