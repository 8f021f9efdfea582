//! Platform alert port (desktop / OS notification surface).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Outcome of a permission request against the alert surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPermission {
    /// Alerts may be shown.
    Granted,
    /// The user or platform refused.
    Denied,
}

impl AlertPermission {
    /// Whether alerts may be shown.
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Adapter to a platform-level alert surface.
///
/// Emissions are fire-and-forget; there is no acknowledgment protocol.
#[async_trait]
pub trait AlertPort: Send + Sync + std::fmt::Debug + 'static {
    /// Ask the platform for permission to show alerts.
    async fn request_permission(&self) -> AppResult<AlertPermission>;

    /// Show one alert.
    async fn emit(&self, title: &str, body: &str) -> AppResult<()>;
}

/// Alert port for environments without an alert surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAlertPort;

#[async_trait]
impl AlertPort for NoopAlertPort {
    async fn request_permission(&self) -> AppResult<AlertPermission> {
        Ok(AlertPermission::Denied)
    }

    async fn emit(&self, _title: &str, _body: &str) -> AppResult<()> {
        Ok(())
    }
}
