//! Local event and platform alert settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Controls the side channels fired when new notifications arrive.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AlertsConfig {
    /// Whether platform alerts are attempted at all. Local events are
    /// always emitted.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Delay between consecutive alerts of one burst, in milliseconds.
    #[serde(default = "default_stagger")]
    pub stagger_ms: u64,
    /// Capacity of the local event broadcast channel.
    #[serde(default = "default_event_buffer")]
    #[validate(range(min = 1))]
    pub event_buffer: usize,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stagger_ms: default_stagger(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_stagger() -> u64 {
    1_000
}

fn default_event_buffer() -> usize {
    64
}
