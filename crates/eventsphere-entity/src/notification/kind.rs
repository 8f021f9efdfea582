//! Notification type enumeration.

use serde::{Deserialize, Serialize};

/// What triggered a notification. Serialized as the backend's
/// SCREAMING_SNAKE_CASE string; unknown values survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    /// An attendee filed a new report (admin/staff audience).
    NewReport,
    /// The status of one of the user's reports changed.
    StatusUpdate,
    /// Someone replied on a report thread.
    NewResponse,
    /// Staff replied on a report thread.
    StaffResponse,
    /// An admin replied on a report thread.
    AdminResponse,
    /// Any type this client does not know about.
    Other(String),
}

impl NotificationKind {
    /// Return the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NewReport => "NEW_REPORT",
            Self::StatusUpdate => "STATUS_UPDATE",
            Self::NewResponse => "NEW_RESPONSE",
            Self::StaffResponse => "STAFF_RESPONSE",
            Self::AdminResponse => "ADMIN_RESPONSE",
            Self::Other(raw) => raw,
        }
    }

    /// Short human label, used as the alert title when the title is blank.
    pub fn label(&self) -> &str {
        match self {
            Self::NewReport => "New report",
            Self::StatusUpdate => "Status update",
            Self::NewResponse => "New response",
            Self::StaffResponse => "Staff response",
            Self::AdminResponse => "Admin response",
            Self::Other(_) => "Notification",
        }
    }

    /// Whether the notification is a reply on a report thread.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            Self::NewResponse | Self::StaffResponse | Self::AdminResponse
        )
    }
}

impl Default for NotificationKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for NotificationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "NEW_REPORT" => Self::NewReport,
            "STATUS_UPDATE" => Self::StatusUpdate,
            "NEW_RESPONSE" => Self::NewResponse,
            "STAFF_RESPONSE" => Self::StaffResponse,
            "ADMIN_RESPONSE" => Self::AdminResponse,
            _ => Self::Other(value),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
