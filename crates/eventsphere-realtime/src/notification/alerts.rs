//! Platform alert dispatch with permission gating.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eventsphere_core::config::AlertsConfig;
use eventsphere_core::traits::{AlertPermission, AlertPort};
use eventsphere_entity::Notification;

use super::formatter::AlertFormatter;

/// Sends platform alerts for new notifications once permission is granted.
///
/// Every failure here is swallowed: alerts are a side channel and never
/// affect the notification state.
#[derive(Debug)]
pub struct AlertDispatcher {
    /// Platform adapter.
    port: Arc<dyn AlertPort>,
    /// Whether alerts are configured on at all.
    enabled: bool,
    /// Set once the platform granted permission.
    permitted: AtomicBool,
    /// Gap between alerts of one burst.
    stagger: Duration,
}

impl AlertDispatcher {
    /// Create a dispatcher; alerts stay off until permission is granted.
    pub fn new(port: Arc<dyn AlertPort>, config: &AlertsConfig) -> Self {
        Self {
            port,
            enabled: config.enabled,
            permitted: AtomicBool::new(false),
            stagger: Duration::from_millis(config.stagger_ms),
        }
    }

    /// Ask the platform for permission and remember the answer.
    pub async fn request_permission(&self) -> AlertPermission {
        if !self.enabled {
            return AlertPermission::Denied;
        }

        let permission = match self.port.request_permission().await {
            Ok(permission) => permission,
            Err(e) => {
                tracing::debug!("Alert permission request failed: {}", e);
                AlertPermission::Denied
            }
        };

        self.permitted
            .store(permission.is_granted(), Ordering::SeqCst);
        tracing::info!(
            "Platform alerts {}",
            if permission.is_granted() {
                "enabled"
            } else {
                "disabled"
            }
        );
        permission
    }

    /// Whether alerts will currently be shown.
    pub fn is_permitted(&self) -> bool {
        self.enabled && self.permitted.load(Ordering::SeqCst)
    }

    /// Gap between alerts of one burst.
    pub fn stagger(&self) -> Duration {
        self.stagger
    }

    /// Show an alert for `notification` if permitted.
    pub async fn alert(&self, notification: &Notification) {
        if !self.is_permitted() {
            return;
        }

        let title = AlertFormatter::title(notification);
        let body = AlertFormatter::body(notification);
        if let Err(e) = self.port.emit(&title, &body).await {
            tracing::warn!("Failed to show alert for notification {}: {}", notification.id, e);
        }
    }
}
