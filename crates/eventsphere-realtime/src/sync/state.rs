//! Locally cached notification state and its reconciliation rules.

use chrono::{DateTime, Utc};

use eventsphere_core::types::NotificationId;
use eventsphere_entity::notification::{Notification, count_unread};

/// Result of optimistically marking one notification read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkReadOutcome {
    /// No notification with that id is held locally.
    NotFound,
    /// It was already read; nothing changed.
    AlreadyRead,
    /// It is now read. `decremented` tells whether the unread count moved
    /// (it cannot go below zero).
    Marked {
        /// Whether `unread_count` was decremented.
        decremented: bool,
    },
}

/// Everything the engine knows about the user's notifications.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Server order, unique by id.
    pub notifications: Vec<Notification>,
    /// Unread notifications as known locally.
    pub unread_count: u64,
    /// Last recorded failure message.
    pub error: Option<String>,
    /// When the last successful poll completed.
    pub last_poll_time: Option<DateTime<Utc>>,
    /// Whether a full list has ever been loaded this session.
    pub initialized: bool,
    /// The list exactly as the server last returned it, before any local
    /// optimistic change. New arrivals are detected against this.
    last_server: Vec<Notification>,
    /// Requests currently in flight.
    pending: u32,
}

impl SyncState {
    /// Whether any request is in flight.
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    /// A request started.
    pub fn begin_request(&mut self) {
        self.pending += 1;
    }

    /// A request finished.
    pub fn end_request(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    /// Last list received from the server.
    pub fn last_server(&self) -> &[Notification] {
        &self.last_server
    }

    /// Replace the list with the server's and recompute the count.
    pub fn replace(&mut self, notifications: Vec<Notification>) {
        self.unread_count = count_unread(&notifications);
        self.last_server = notifications.clone();
        self.notifications = notifications;
        self.initialized = true;
        self.error = None;
    }

    /// Record a failed fetch. Keeps the last good state, unless there has
    /// never been one, in which case the view falls back to empty.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        if !self.initialized {
            self.notifications.clear();
            self.unread_count = 0;
        }
    }

    /// Optimistically mark one notification read.
    pub fn apply_mark_read(&mut self, id: &NotificationId) -> MarkReadOutcome {
        let Some(notification) = self.notifications.iter_mut().find(|n| &n.id == id) else {
            return MarkReadOutcome::NotFound;
        };
        if notification.read {
            return MarkReadOutcome::AlreadyRead;
        }

        notification.read = true;
        let decremented = self.unread_count > 0;
        self.unread_count = self.unread_count.saturating_sub(1);
        MarkReadOutcome::Marked { decremented }
    }

    /// Undo [`apply_mark_read`](Self::apply_mark_read) by inverse delta, so
    /// concurrent mutations of other ids are left alone.
    ///
    /// The count moves only if the item is still locally read. A list that
    /// was replaced in the meantime already counts it.
    pub fn revert_mark_read(&mut self, id: &NotificationId, decremented: bool) {
        let Some(notification) = self
            .notifications
            .iter_mut()
            .find(|n| &n.id == id && n.read)
        else {
            return;
        };

        notification.read = false;
        if decremented {
            self.unread_count += 1;
        }
    }

    /// Optimistically mark everything read. Returns the previous count.
    pub fn apply_mark_all_read(&mut self) -> u64 {
        for notification in &mut self.notifications {
            notification.read = true;
        }
        std::mem::take(&mut self.unread_count)
    }

    /// Optimistically remove one notification.
    pub fn apply_remove(&mut self, id: &NotificationId) -> Option<Notification> {
        let index = self.notifications.iter().position(|n| &n.id == id)?;
        let removed = self.notifications.remove(index);
        if removed.is_unread() {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
        Some(removed)
    }
}
