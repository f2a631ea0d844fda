//! Session-held models for the storefront.

pub mod notification;
pub mod session;

pub use notification::{Notification, NotificationLevel};
pub use session::{AuthState, CurrentAdmin, CurrentUser, PendingCheckout, keys as session_keys};
