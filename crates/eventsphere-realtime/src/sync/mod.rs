//! Notification state ownership and reconciliation.

pub mod engine;
pub mod state;

pub use engine::{NotificationSnapshot, NotificationSyncEngine};
pub use state::{MarkReadOutcome, SyncState};
