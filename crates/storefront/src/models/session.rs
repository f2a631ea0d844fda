//! Session-related types.
//!
//! Types stored in the session for authentication and checkout state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slash_core::{CartId, CurrencyCode, Email, OrderId, UserId};

/// Session-stored user identity.
///
/// Minimal profile data returned by the identity provider at sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Provider subject identifier.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name, if the provider shares one.
    pub name: Option<String>,
    /// Avatar URL, if the provider shares one.
    pub avatar_url: Option<String>,
}

impl CurrentUser {
    /// Name to greet the user by, falling back to the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.local_part())
    }

    /// Avatar fallback: the email's first letter, uppercased.
    #[must_use]
    pub fn initial(&self) -> String {
        self.email.initial()
    }
}

/// Whether the visitor is signed in.
///
/// Views branch on this rather than on a nullable user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    Authenticated(CurrentUser),
    #[default]
    Anonymous,
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }
}

impl From<Option<CurrentUser>> for AuthState {
    fn from(user: Option<CurrentUser>) -> Self {
        user.map_or(Self::Anonymous, Self::Authenticated)
    }
}

/// Session-stored admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: String,
    pub signed_in_at: DateTime<Utc>,
}

/// A gateway order created for a cart and awaiting its payment callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckout {
    pub cart_id: CartId,
    pub order_id: OrderId,
    /// Amount in the currency's minor unit (paise for INR).
    pub amount_minor: i64,
    pub currency: CurrencyCode,
}

/// Session keys.
pub mod keys {
    /// Cart contents and snapshots.
    pub const CART: &str = "cart";

    /// Navigation shell view state.
    pub const SHELL: &str = "shell";

    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Identity provider tokens for the current user.
    pub const IDENTITY_TOKENS: &str = "identity_tokens";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for OAuth nonce (`OpenID` Connect replay protection).
    pub const OAUTH_NONCE: &str = "oauth_nonce";

    /// Key for the signed-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Gateway order awaiting completion.
    pub const PENDING_CHECKOUT: &str = "pending_checkout";

    /// Queued toast notifications.
    pub const NOTIFICATIONS: &str = "notifications";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(name: Option<&str>) -> CurrentUser {
        CurrentUser {
            id: UserId::new("sub-123"),
            email: Email::parse("asha@example.com").unwrap(),
            name: name.map(str::to_string),
            avatar_url: None,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(user(Some("Asha Rao")).display_name(), "Asha Rao");
        assert_eq!(user(None).display_name(), "asha");
        assert_eq!(user(Some("  ")).display_name(), "asha");
        assert_eq!(user(None).initial(), "A");
    }

    #[test]
    fn test_auth_state_from_option() {
        let state = AuthState::from(Some(user(None)));
        assert!(state.is_authenticated());
        assert_eq!(state.user().unwrap().id.as_str(), "sub-123");

        let state = AuthState::from(None);
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
    }
}
