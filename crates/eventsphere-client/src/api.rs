//! The notifications API contract.

use async_trait::async_trait;

use eventsphere_core::result::AppResult;
use eventsphere_core::types::NotificationId;
use eventsphere_entity::Notification;

/// Remote notification store of the signed-in user.
///
/// Every call is authenticated with the current session's bearer token.
/// Implementations map non-2xx responses to [`eventsphere_core::AppError`]
/// with the backend's message.
#[async_trait]
pub trait NotificationApi: Send + Sync + std::fmt::Debug + 'static {
    /// `GET /notifications`, newest first.
    async fn list(&self) -> AppResult<Vec<Notification>>;

    /// `GET /notifications/unread`.
    async fn list_unread(&self) -> AppResult<Vec<Notification>>;

    /// Number of unread notifications according to the server.
    async fn unread_count(&self) -> AppResult<u64>;

    /// `PATCH /notifications/{id}/read`.
    async fn mark_read(&self, id: &NotificationId) -> AppResult<()>;

    /// `PATCH /notifications/read-all`.
    async fn mark_all_read(&self) -> AppResult<()>;

    /// `DELETE /notifications/{id}`.
    async fn delete(&self, id: &NotificationId) -> AppResult<()>;
}
