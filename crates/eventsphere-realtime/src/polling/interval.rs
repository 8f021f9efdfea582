//! Adaptive polling interval.

use std::time::Duration;

use eventsphere_core::config::PollingConfig;

/// The current poll period and the rules that move it.
///
/// Always stays within `[floor, ceiling]`. Quiet polls back off towards
/// the ceiling; failed polls tighten towards the floor; visibility and
/// focus changes jump straight to one bound.
#[derive(Debug, Clone)]
pub struct AdaptiveInterval {
    current_ms: u64,
    floor_ms: u64,
    ceiling_ms: u64,
    backoff_factor: f64,
    recovery_factor: f64,
}

impl AdaptiveInterval {
    /// Start at the floor.
    pub fn new(config: &PollingConfig) -> Self {
        let floor_ms = config.floor_ms;
        let ceiling_ms = config.ceiling_ms.max(floor_ms);
        Self {
            current_ms: floor_ms,
            floor_ms,
            ceiling_ms,
            backoff_factor: config.backoff_factor,
            recovery_factor: config.recovery_factor,
        }
    }

    /// Current period in milliseconds.
    pub fn current_ms(&self) -> u64 {
        self.current_ms
    }

    /// Current period.
    pub fn current(&self) -> Duration {
        Duration::from_millis(self.current_ms)
    }

    /// A poll succeeded and found nothing new. Returns the new period.
    pub fn on_quiet_success(&mut self) -> u64 {
        self.scale(self.backoff_factor)
    }

    /// A poll failed. Returns the new period.
    pub fn on_error(&mut self) -> u64 {
        self.scale(self.recovery_factor)
    }

    /// The page went to the background.
    pub fn on_hidden(&mut self) -> u64 {
        self.current_ms = self.ceiling_ms;
        self.current_ms
    }

    /// The page became visible or focused.
    pub fn on_engaged(&mut self) -> u64 {
        self.current_ms = self.floor_ms;
        self.current_ms
    }

    /// Back to the start value.
    pub fn reset(&mut self) {
        self.current_ms = self.floor_ms;
    }

    fn scale(&mut self, factor: f64) -> u64 {
        let next = (self.current_ms as f64 * factor).round() as u64;
        self.current_ms = next.clamp(self.floor_ms, self.ceiling_ms);
        self.current_ms
    }
}
