//! Authentication error types.

use thiserror::Error;

use crate::identity::IdentityError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format in the provider profile.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] slash_core::EmailError),

    /// Invalid credentials (wrong admin id or password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Admin login is not configured.
    #[error("admin login is disabled")]
    AdminDisabled,

    /// OAuth state missing or mismatched.
    #[error("invalid session state")]
    InvalidSessionState,

    /// The ID token's nonce does not match the one stored at sign-in.
    #[error("ID token nonce mismatch")]
    InvalidNonce,

    /// Identity provider error.
    #[error("identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
