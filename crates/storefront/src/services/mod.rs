//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Visitor sign-in through the identity provider, admin login
//! - `checkout` - Payment gateway orders and completion for the session cart

pub mod auth;
pub mod checkout;

pub use auth::{AuthError, AuthService, SignInRequest, StoredSignIn};
pub use checkout::{CheckoutError, CheckoutPermit, CheckoutService, InFlightCheckouts, StartedCheckout};
