//! In-process broadcast of [`NotificationEvent`]s.

use tokio::sync::broadcast;

use super::NotificationEvent;

/// Single-channel broadcast bus for notification events.
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Broadcast sender; receivers are created on subscribe.
    sender: broadcast::Sender<NotificationEvent>,
}

impl EventBus {
    /// Create a bus holding at most `buffer_size` undelivered events per
    /// subscriber.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size.max(1));
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: NotificationEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Notification event dropped: no subscribers");
        }
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
