//! Toast notifications.
//!
//! Handlers queue notifications in the session; the next full page render
//! drains and displays them.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

impl NotificationLevel {
    /// CSS modifier used by the toast template.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A queued toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Notification {
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append to the session queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn push(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        let mut queue: Vec<Self> = session
            .get(session_keys::NOTIFICATIONS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        queue.push(self);
        session.insert(session_keys::NOTIFICATIONS, queue).await
    }

    /// Remove and return every queued notification.
    pub async fn take_all(session: &Session) -> Vec<Self> {
        session
            .remove::<Vec<Self>>(session_keys::NOTIFICATIONS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}
