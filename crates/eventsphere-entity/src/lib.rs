//! # eventsphere-entity
//!
//! Models exchanged with the EventSphere backend. Every struct mirrors the
//! backend's camelCase JSON and derives `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod notification;

pub use notification::{Notification, NotificationKind};
