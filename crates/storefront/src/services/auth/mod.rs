//! Authentication service.
//!
//! Visitors sign in through the external identity provider; the storefront
//! only keeps the resulting profile in the session. Admins sign in with a
//! configured id and an Argon2 password hash.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use rand::Rng;
use secrecy::ExposeSecret;

use slash_core::{Email, UserId};

use crate::config::AdminConfig;
use crate::identity::{IdentityError, IdentityProvider, IdentityTokens, id_token_nonce};
use crate::models::{CurrentAdmin, CurrentUser};

/// Length of the OAuth `state` and `nonce` values.
const OAUTH_TOKEN_LENGTH: usize = 32;

/// A started sign-in: values to keep in the session and the URL to visit.
#[derive(Debug, Clone)]
pub struct SignInRequest {
    pub state: String,
    pub nonce: String,
    pub authorization_url: String,
}

/// Sign-in values read back from the session at callback time.
#[derive(Debug, Clone, Default)]
pub struct StoredSignIn {
    pub state: Option<String>,
    pub nonce: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    identity: &'a dyn IdentityProvider,
    admin: Option<&'a AdminConfig>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(identity: &'a dyn IdentityProvider, admin: Option<&'a AdminConfig>) -> Self {
        Self { identity, admin }
    }

    // =========================================================================
    // Identity Provider
    // =========================================================================

    /// Start an OAuth sign-in.
    #[must_use]
    pub fn begin_sign_in(&self, redirect_uri: &str) -> SignInRequest {
        let state = generate_random_string(OAUTH_TOKEN_LENGTH);
        let nonce = generate_random_string(OAUTH_TOKEN_LENGTH);
        let authorization_url = self.identity.authorization_url(redirect_uri, &state, &nonce);
        SignInRequest {
            state,
            nonce,
            authorization_url,
        }
    }

    /// Finish an OAuth sign-in from the provider callback.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSessionState` if the returned state does not
    /// match the one stored at sign-in, `AuthError::InvalidNonce` if the ID
    /// token carries a different nonce, `AuthError::Identity` if the code
    /// exchange or profile fetch fails, and `AuthError::InvalidEmail` if the
    /// profile lacks a valid email.
    pub async fn complete_sign_in(
        &self,
        stored: &StoredSignIn,
        returned_state: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<(CurrentUser, IdentityTokens), AuthError> {
        if stored.state.as_deref() != Some(returned_state) {
            return Err(AuthError::InvalidSessionState);
        }

        let tokens = self.identity.exchange_code(code, redirect_uri).await?;
        if let Some(id_token) = tokens.id_token.as_deref() {
            let nonce = id_token_nonce(id_token)?;
            if nonce.is_none() || nonce != stored.nonce {
                return Err(AuthError::InvalidNonce);
            }
        }
        let profile = self.identity.fetch_profile(&tokens.access_token).await?;

        let email = profile.email.ok_or(IdentityError::MissingEmail)?;
        let user = CurrentUser {
            id: UserId::new(profile.sub),
            email: Email::parse(&email)?,
            name: profile.name,
            avatar_url: profile.picture,
        };

        Ok((user, tokens))
    }

    /// Revoke the provider token, if any.
    ///
    /// The caller clears the session only when this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Identity` if the provider refuses the revocation.
    pub async fn sign_out(&self, tokens: Option<&IdentityTokens>) -> Result<(), AuthError> {
        if let Some(tokens) = tokens {
            self.identity.revoke(&tokens.access_token).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Admin Login
    // =========================================================================

    /// Verify admin credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AdminDisabled` if no admin is configured and
    /// `AuthError::InvalidCredentials` if the id or password is wrong.
    pub fn admin_login(&self, id: &str, password: &str) -> Result<CurrentAdmin, AuthError> {
        let admin = self.admin.ok_or(AuthError::AdminDisabled)?;

        // Always run the hash check so a wrong id costs the same as a wrong password.
        let password_ok = verify_password(password, admin.password_hash.expose_secret()).is_ok();
        if !password_ok || id.trim() != admin.id {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(CurrentAdmin {
            id: admin.id.clone(),
            signed_in_at: Utc::now(),
        })
    }
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&b| char::from(b))
        .collect()
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use secrecy::SecretString;

    use super::*;
    use crate::identity::IdentityProfile;

    #[derive(Default)]
    struct StubIdentity {
        email: Option<String>,
        id_token: Option<String>,
        revoke_fails: bool,
        revoked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IdentityProvider for StubIdentity {
        fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
            format!("https://idp.test/authorize?redirect_uri={redirect_uri}&state={state}&nonce={nonce}")
        }

        async fn exchange_code(
            &self,
            code: &str,
            _redirect_uri: &str,
        ) -> Result<IdentityTokens, IdentityError> {
            Ok(IdentityTokens {
                access_token: format!("token-for-{code}"),
                id_token: self.id_token.clone(),
                refresh_token: None,
                expires_in: Some(3600),
                obtained_at: 0,
            })
        }

        async fn fetch_profile(&self, _access_token: &str) -> Result<IdentityProfile, IdentityError> {
            Ok(IdentityProfile {
                sub: "google-oauth2|42".to_string(),
                email: self.email.clone(),
                name: Some("Asha Rao".to_string()),
                picture: None,
            })
        }

        async fn revoke(&self, token: &str) -> Result<(), IdentityError> {
            if self.revoke_fails {
                return Err(IdentityError::OAuth("revocation failed".to_string()));
            }
            self.revoked.lock().unwrap().push(token.to_string());
            Ok(())
        }
    }

    fn stored(state: &str) -> StoredSignIn {
        StoredSignIn {
            state: Some(state.to_string()),
            nonce: Some("n0nce".to_string()),
        }
    }

    fn id_token(nonce: &str) -> String {
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        format!(
            "e30.{}.c2ln",
            URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"42","nonce":"{nonce}"}}"#))
        )
    }

    fn stub(email: Option<&str>) -> StubIdentity {
        StubIdentity {
            email: email.map(str::to_string),
            ..StubIdentity::default()
        }
    }

    #[test]
    fn test_begin_sign_in_generates_fresh_state() {
        let identity = stub(None);
        let service = AuthService::new(&identity, None);

        let first = service.begin_sign_in("https://slash.test/auth/callback");
        let second = service.begin_sign_in("https://slash.test/auth/callback");

        assert_eq!(first.state.len(), OAUTH_TOKEN_LENGTH);
        assert_eq!(first.nonce.len(), OAUTH_TOKEN_LENGTH);
        assert_ne!(first.state, second.state);
        assert!(first.authorization_url.contains(&first.state));
    }

    #[tokio::test]
    async fn test_complete_sign_in_builds_current_user() {
        let identity = stub(Some("asha@example.com"));
        let service = AuthService::new(&identity, None);

        let (user, tokens) = service
            .complete_sign_in(&stored("abc"), "abc", "code-1", "https://slash.test/auth/callback")
            .await
            .unwrap();

        assert_eq!(user.id.as_str(), "google-oauth2|42");
        assert_eq!(user.email.as_str(), "asha@example.com");
        assert_eq!(user.name.as_deref(), Some("Asha Rao"));
        assert_eq!(tokens.access_token, "token-for-code-1");
    }

    #[tokio::test]
    async fn test_complete_sign_in_rejects_state_mismatch() {
        let identity = stub(Some("asha@example.com"));
        let service = AuthService::new(&identity, None);

        let result = service.complete_sign_in(&stored("abc"), "xyz", "code", "uri").await;
        assert!(matches!(result, Err(AuthError::InvalidSessionState)));

        let result = service
            .complete_sign_in(&StoredSignIn::default(), "xyz", "code", "uri")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidSessionState)));
    }

    #[tokio::test]
    async fn test_complete_sign_in_checks_id_token_nonce() {
        let identity = StubIdentity {
            id_token: Some(id_token("n0nce")),
            ..stub(Some("asha@example.com"))
        };
        let service = AuthService::new(&identity, None);
        assert!(service.complete_sign_in(&stored("s"), "s", "code", "uri").await.is_ok());

        let replayed = StubIdentity {
            id_token: Some(id_token("other")),
            ..stub(Some("asha@example.com"))
        };
        let service = AuthService::new(&replayed, None);
        let result = service.complete_sign_in(&stored("s"), "s", "code", "uri").await;
        assert!(matches!(result, Err(AuthError::InvalidNonce)));

        let without_stored_nonce = StoredSignIn {
            nonce: None,
            ..stored("s")
        };
        let result = service.complete_sign_in(&without_stored_nonce, "s", "code", "uri").await;
        assert!(matches!(result, Err(AuthError::InvalidNonce)));
    }

    #[tokio::test]
    async fn test_complete_sign_in_requires_email() {
        let identity = stub(None);
        let service = AuthService::new(&identity, None);

        let result = service.complete_sign_in(&stored("s"), "s", "code", "uri").await;
        assert!(matches!(
            result,
            Err(AuthError::Identity(IdentityError::MissingEmail))
        ));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let identity = stub(None);
        let service = AuthService::new(&identity, None);
        let tokens = IdentityTokens {
            access_token: "live-token".to_string(),
            id_token: None,
            refresh_token: None,
            expires_in: None,
            obtained_at: 0,
        };

        service.sign_out(Some(&tokens)).await.unwrap();
        service.sign_out(None).await.unwrap();

        assert_eq!(*identity.revoked.lock().unwrap(), vec!["live-token".to_string()]);
    }

    #[tokio::test]
    async fn test_sign_out_surfaces_revocation_failure() {
        let identity = StubIdentity {
            revoke_fails: true,
            ..StubIdentity::default()
        };
        let service = AuthService::new(&identity, None);
        let tokens = IdentityTokens {
            access_token: "live-token".to_string(),
            id_token: None,
            refresh_token: None,
            expires_in: None,
            obtained_at: 0,
        };

        assert!(service.sign_out(Some(&tokens)).await.is_err());
    }

    #[test]
    fn test_admin_login() {
        let identity = stub(None);
        let admin = AdminConfig {
            id: "ops".to_string(),
            password_hash: SecretString::from(hash_password("correct horse battery").unwrap()),
        };
        let service = AuthService::new(&identity, Some(&admin));

        let current = service.admin_login("ops", "correct horse battery").unwrap();
        assert_eq!(current.id, "ops");

        assert!(matches!(
            service.admin_login("ops", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.admin_login("someone", "correct horse battery"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_admin_login_disabled_without_config() {
        let identity = stub(None);
        let service = AuthService::new(&identity, None);
        assert!(matches!(
            service.admin_login("ops", "anything"),
            Err(AuthError::AdminDisabled)
        ));
    }
}
