//! Local events emitted to UI consumers (badge counters, toasts, ...).

pub mod bus;

use chrono::{DateTime, Utc};
use serde::Serialize;

use eventsphere_entity::Notification;

pub use bus::EventBus;

/// An event published by the sync engine. Fire-and-forget: consumers that
/// lag behind the channel buffer miss events rather than block the engine.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A notification was observed for the first time by a poll.
    Received {
        /// The new notification.
        notification: Notification,
        /// When the engine published the event.
        timestamp: DateTime<Utc>,
    },
    /// The locally known unread count changed.
    UnreadCountChanged {
        /// The new count.
        count: u64,
    },
}

impl NotificationEvent {
    /// Build a `Received` event stamped now.
    pub fn received(notification: Notification) -> Self {
        Self::Received {
            notification,
            timestamp: Utc::now(),
        }
    }
}
