//! Alert text for notifications.

use eventsphere_entity::Notification;

/// Formats platform alerts for notifications.
pub struct AlertFormatter;

impl AlertFormatter {
    /// Alert title: the notification title, or the type label if blank.
    pub fn title(notification: &Notification) -> String {
        let title = notification.title.trim();
        if title.is_empty() {
            notification.kind.label().to_string()
        } else {
            title.to_string()
        }
    }

    /// Alert body: the message, suffixed with the sender role when known.
    pub fn body(notification: &Notification) -> String {
        let message = notification.message.trim();
        match notification.sender_role.as_deref() {
            Some(role) if !role.is_empty() && !message.is_empty() => {
                format!("{message} (from {role})")
            }
            _ => message.to_string(),
        }
    }
}
