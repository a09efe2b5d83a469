//! Transient user-facing notifications.
//!
//! Every outcome a user should hear about (success, validation failure, connectivity
//! change, share fallback) is described by a [`Notice`]. Front ends decide how to show
//! it but keep it visible for [`NOTICE_DURATION`].

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::repository::ListError;

/// How long a notice stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Display time for this notice.
    pub fn duration(&self) -> Duration {
        NOTICE_DURATION
    }

    pub fn item_added() -> Self {
        Self::success("Item added successfully!")
    }

    pub fn item_updated() -> Self {
        Self::success("Item updated successfully!")
    }

    pub fn item_deleted() -> Self {
        Self::error("Item deleted.")
    }

    pub fn list_cleared() -> Self {
        Self::error("Current list has been cleared.")
    }

    pub fn list_saved(name: &str) -> Self {
        Self::success(format!("List \"{name}\" saved successfully!"))
    }

    /// A save that went to the offline staging buffer.
    pub fn list_staged(name: &str) -> Self {
        Self::info(format!(
            "You are offline. List \"{name}\" will be synced when you reconnect."
        ))
    }

    pub fn list_loaded(name: &str) -> Self {
        Self::success(format!("List \"{name}\" loaded successfully!"))
    }

    pub fn list_deleted(name: &str) -> Self {
        Self::error(format!("List \"{name}\" deleted."))
    }

    pub fn back_online() -> Self {
        Self::info("You are back online. Attempting to sync saved lists.")
    }

    pub fn gone_offline() -> Self {
        Self::info("You are offline. Changes are kept on this device.")
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&ListError> for Notice {
    fn from(err: &ListError) -> Self {
        let message = match err {
            ListError::EmptyItemName => "Please enter an item name.".to_string(),
            ListError::EmptyListName => "Please provide a name for your list.".to_string(),
            ListError::EmptyList => "Cannot save an empty list.".to_string(),
            other => other.to_string(),
        };
        Self::error(message)
    }
}
