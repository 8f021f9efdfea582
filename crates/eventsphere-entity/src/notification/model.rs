//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::types::{EntityId, NotificationId};

use super::kind::NotificationKind;

/// A notification as returned by `GET /notifications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    #[serde(alias = "_id")]
    pub id: NotificationId,
    /// What triggered the notification.
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    /// Notification title.
    #[serde(default)]
    pub title: String,
    /// Notification body text.
    #[serde(default)]
    pub message: String,
    /// Whether the user has read this notification.
    #[serde(default, alias = "isRead")]
    pub read: bool,
    /// Entity to open when the notification is clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<EntityId>,
    /// Role of whoever caused the notification (`admin`, `staff`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_role: Option<String>,
    /// When the notification was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Create an unread notification with the given id, kind, and text.
    pub fn new(
        id: impl Into<NotificationId>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            related_entity_id: None,
            sender_role: None,
            created_at: None,
        }
    }

    /// Return a copy with the `read` flag set.
    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.read
    }
}

/// Body of `GET /notifications/count`. The backend has shipped the field
/// under several names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    /// Number of unread notifications.
    #[serde(alias = "unreadCount", alias = "unread_count")]
    pub count: u64,
}

/// Count the unread notifications in a list.
pub fn count_unread(notifications: &[Notification]) -> u64 {
    notifications.iter().filter(|n| n.is_unread()).count() as u64
}
