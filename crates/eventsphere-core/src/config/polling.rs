//! Adaptive polling configuration.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// How newly arrived notifications are told apart from known ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewItemDetection {
    /// Compare ids against the previously held list.
    #[default]
    Identity,
    /// Treat list growth of `k` as the first `k` items being new. Only
    /// correct while the server prepends and never evicts.
    Length,
}

/// Bounds and factors of the adaptive polling interval.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_bounds"))]
pub struct PollingConfig {
    /// Shortest interval, used after focus/visibility and as the start value.
    #[serde(default = "default_floor")]
    #[validate(range(min = 100))]
    pub floor_ms: u64,
    /// Longest interval, used while the page is hidden.
    #[serde(default = "default_ceiling")]
    pub ceiling_ms: u64,
    /// Multiplier applied after a quiet successful poll.
    #[serde(default = "default_backoff")]
    #[validate(range(min = 1.0))]
    pub backoff_factor: f64,
    /// Multiplier applied after a failed poll.
    #[serde(default = "default_recovery")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub recovery_factor: f64,
    /// New-notification detection strategy.
    #[serde(default)]
    pub detection: NewItemDetection,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            floor_ms: default_floor(),
            ceiling_ms: default_ceiling(),
            backoff_factor: default_backoff(),
            recovery_factor: default_recovery(),
            detection: NewItemDetection::default(),
        }
    }
}

fn validate_bounds(config: &PollingConfig) -> Result<(), ValidationError> {
    if config.ceiling_ms < config.floor_ms {
        return Err(ValidationError::new("ceiling_below_floor"));
    }
    Ok(())
}

fn default_floor() -> u64 {
    5_000
}

fn default_ceiling() -> u64 {
    30_000
}

fn default_backoff() -> f64 {
    1.2
}

fn default_recovery() -> f64 {
    0.8
}
