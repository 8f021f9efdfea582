//! # eventsphere-realtime
//!
//! Client-side notification sync engine for EventSphere. Provides:
//!
//! - A locally cached notification list and unread count, refreshed by polling
//! - Optimistic read/delete mutations with rollback or resync on failure
//! - Adaptive poll cadence driven by poll outcomes and page visibility/focus
//! - New-notification detection with staggered local events and platform alerts

pub mod events;
pub mod notification;
pub mod polling;
pub mod sync;

pub use events::{EventBus, NotificationEvent};
pub use polling::{AdaptiveInterval, PageEvent, PollerState};
pub use sync::{NotificationSnapshot, NotificationSyncEngine};
