//! Adaptive poll scheduling: interval policy, page signals, and the
//! self-rescheduling timer task.

pub mod interval;
pub mod page;
pub(crate) mod scheduler;

use serde::{Deserialize, Serialize};

pub use interval::AdaptiveInterval;
pub use page::PageEvent;

/// Whether the engine currently has a poll timer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    /// No timer; unauthenticated or torn down.
    Idle,
    /// Timer active.
    Polling,
}

impl PollerState {
    /// Converts to string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Polling => "polling",
        }
    }
}
