//! The notification sync engine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use eventsphere_client::NotificationApi;
use eventsphere_core::config::{AppConfig, NewItemDetection};
use eventsphere_core::error::AppError;
use eventsphere_core::result::AppResult;
use eventsphere_core::traits::{AlertPermission, AlertPort, CredentialProvider};
use eventsphere_core::types::NotificationId;
use eventsphere_entity::Notification;

use crate::events::{EventBus, NotificationEvent};
use crate::notification::{AlertDispatcher, detect_new};
use crate::polling::interval::AdaptiveInterval;
use crate::polling::page::PageEvent;
use crate::polling::{PollerState, scheduler};

use super::state::{MarkReadOutcome, SyncState};

/// Point-in-time copy of the engine state for UI consumers.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationSnapshot {
    /// Notifications in server order.
    pub notifications: Vec<Notification>,
    /// Unread notifications as known locally.
    pub unread_count: u64,
    /// Whether any request is in flight.
    pub loading: bool,
    /// Last recorded failure message.
    pub error: Option<String>,
    /// Current adaptive poll period.
    pub poll_interval_ms: u64,
    /// When the last successful poll completed.
    pub last_poll_time: Option<DateTime<Utc>>,
    /// Whether the poll timer is running.
    pub poller: PollerState,
}

/// Handle to a running poll timer and its listeners.
#[derive(Debug)]
struct PollerHandle {
    /// Cancels the timer and every attached listener.
    cancel: CancellationToken,
}

#[derive(Debug)]
struct EngineInner {
    api: Arc<dyn NotificationApi>,
    credentials: Arc<dyn CredentialProvider>,
    alerts: AlertDispatcher,
    bus: EventBus,
    detection: NewItemDetection,
    state: Mutex<SyncState>,
    interval: Mutex<AdaptiveInterval>,
    poller: Mutex<Option<PollerHandle>>,
    /// Bumped on teardown; results of requests started under an older
    /// epoch are discarded.
    epoch: AtomicU64,
}

/// Owns the client-visible notification list and unread count.
///
/// Cloning is cheap and yields a handle to the same engine. All state
/// lives behind short-lived locks that are never held across an await, so
/// overlapping polls and mutations interleave freely; whichever request
/// completes last writes last.
#[derive(Debug, Clone)]
pub struct NotificationSyncEngine {
    inner: Arc<EngineInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl NotificationSyncEngine {
    /// Create an idle engine.
    pub fn new(
        api: Arc<dyn NotificationApi>,
        credentials: Arc<dyn CredentialProvider>,
        alerts: Arc<dyn AlertPort>,
        config: &AppConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                api,
                credentials,
                alerts: AlertDispatcher::new(alerts, &config.alerts),
                bus: EventBus::new(config.alerts.event_buffer),
                detection: config.polling.detection,
                state: Mutex::new(SyncState::default()),
                interval: Mutex::new(AdaptiveInterval::new(&config.polling)),
                poller: Mutex::new(None),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    // ── Read side ────────────────────────────────────────────────

    /// Copy of the current state.
    pub fn snapshot(&self) -> NotificationSnapshot {
        let poll_interval_ms = self.poll_interval_ms();
        let poller = self.poller_state();
        let state = self.state();
        NotificationSnapshot {
            notifications: state.notifications.clone(),
            unread_count: state.unread_count,
            loading: state.loading(),
            error: state.error.clone(),
            poll_interval_ms,
            last_poll_time: state.last_poll_time,
            poller,
        }
    }

    /// Notifications in server order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }

    /// Unread notifications as known locally.
    pub fn unread_count(&self) -> u64 {
        self.state().unread_count
    }

    /// Last recorded failure message.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Current adaptive poll period in milliseconds.
    pub fn poll_interval_ms(&self) -> u64 {
        lock(&self.inner.interval).current_ms()
    }

    /// Whether the poll timer is running.
    pub fn poller_state(&self) -> PollerState {
        if lock(&self.inner.poller).is_some() {
            PollerState::Polling
        } else {
            PollerState::Idle
        }
    }

    /// Subscribe to local notification events.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.bus.subscribe()
    }

    pub(crate) fn current_interval(&self) -> Duration {
        lock(&self.inner.interval).current()
    }

    // ── Fetching ─────────────────────────────────────────────────

    /// Load the full list and replace local state.
    ///
    /// Failures are recorded in [`error`](Self::error) rather than
    /// returned; a failure before the first successful load leaves an empty
    /// view, later failures keep the last good one.
    pub async fn fetch_all(&self) {
        let epoch = self.epoch();
        self.state().begin_request();

        let result = self.inner.api.list().await;
        if !self.is_current(epoch) {
            tracing::debug!("Discarding notification list fetched before teardown");
            return;
        }

        let (before, after) = {
            let mut state = self.state();
            state.end_request();
            let before = state.unread_count;
            match result {
                Ok(list) => state.replace(list),
                Err(e) => {
                    tracing::warn!("Failed to fetch notifications: {}", e);
                    state.record_failure(e.message);
                }
            }
            (before, state.unread_count)
        };
        self.publish_count_change(before, after);
    }

    /// Refresh only the unread count from the server.
    pub async fn fetch_unread_count(&self) {
        let epoch = self.epoch();
        self.state().begin_request();

        let result = self.inner.api.unread_count().await;
        if !self.is_current(epoch) {
            return;
        }

        let (before, after) = {
            let mut state = self.state();
            state.end_request();
            let before = state.unread_count;
            match result {
                Ok(count) => {
                    state.unread_count = count;
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch unread count: {}", e);
                    state.error = Some(e.message);
                }
            }
            (before, state.unread_count)
        };
        self.publish_count_change(before, after);
    }

    /// One adaptive poll: refresh the list, announce new notifications,
    /// and move the interval according to the outcome.
    pub async fn poll_for_updates(&self) {
        let epoch = self.epoch();
        self.state().begin_request();

        let result = self.inner.api.list().await;
        if !self.is_current(epoch) {
            tracing::debug!("Discarding poll result that arrived after teardown");
            return;
        }

        match result {
            Ok(list) => {
                let (arrivals, before, after) = {
                    let mut state = self.state();
                    state.end_request();
                    // The first load of a session is a baseline, not news.
                    let arrivals = if state.initialized {
                        detect_new(state.last_server(), &list, self.inner.detection)
                    } else {
                        Vec::new()
                    };
                    let before = state.unread_count;
                    state.replace(list);
                    state.last_poll_time = Some(Utc::now());
                    (arrivals, before, state.unread_count)
                };

                let next_ms = {
                    let mut interval = lock(&self.inner.interval);
                    if arrivals.is_empty() {
                        interval.on_quiet_success()
                    } else {
                        interval.current_ms()
                    }
                };
                tracing::debug!(
                    unread = after,
                    new = arrivals.len(),
                    next_ms,
                    "Poll completed"
                );

                self.publish_count_change(before, after);
                if !arrivals.is_empty() {
                    tracing::info!("{} new notification(s)", arrivals.len());
                    self.dispatch_arrivals(arrivals, epoch);
                }
            }
            Err(e) => {
                {
                    let mut state = self.state();
                    state.end_request();
                    state.record_failure(e.message.clone());
                }
                let next_ms = lock(&self.inner.interval).on_error();
                tracing::warn!(next_ms, "Poll failed: {}", e);
            }
        }
    }

    // ── Optimistic mutations ─────────────────────────────────────

    /// Mark one notification read.
    ///
    /// Applied locally first; if the server rejects it, the notification
    /// and the unread count are restored and the error is returned.
    pub async fn mark_as_read(&self, id: &NotificationId) -> AppResult<()> {
        let epoch = self.epoch();

        let (outcome, before, after) = {
            let mut state = self.state();
            let before = state.unread_count;
            let outcome = state.apply_mark_read(id);
            (outcome, before, state.unread_count)
        };

        let decremented = match outcome {
            MarkReadOutcome::NotFound => {
                return Err(AppError::not_found(format!("Notification {id} not found")));
            }
            MarkReadOutcome::AlreadyRead => return Ok(()),
            MarkReadOutcome::Marked { decremented } => decremented,
        };
        self.publish_count_change(before, after);

        let Err(e) = self.inner.api.mark_read(id).await else {
            return Ok(());
        };

        tracing::warn!("Failed to mark notification {} as read: {}", id, e);
        if self.is_current(epoch) {
            let (before, after) = {
                let mut state = self.state();
                let before = state.unread_count;
                state.revert_mark_read(id, decremented);
                state.error = Some(e.message.clone());
                (before, state.unread_count)
            };
            self.publish_count_change(before, after);
        }
        Err(e)
    }

    /// Mark every notification read.
    ///
    /// Applied locally first; if the server rejects it, local state is
    /// resynced from the server instead of replayed, and the error is
    /// returned.
    pub async fn mark_all_as_read(&self) -> AppResult<()> {
        let epoch = self.epoch();

        let previous = self.state().apply_mark_all_read();
        self.publish_count_change(previous, 0);

        let Err(e) = self.inner.api.mark_all_read().await else {
            return Ok(());
        };

        tracing::warn!(
            previous_unread = previous,
            "Failed to mark all notifications as read, resyncing: {}",
            e
        );
        self.resync_after_failure(epoch, &e).await;
        Err(e)
    }

    /// Delete one notification.
    ///
    /// Removed locally first (the unread count drops only if it was
    /// unread); if the server rejects it, local state is resynced and the
    /// error is returned.
    pub async fn delete_notification(&self, id: &NotificationId) -> AppResult<()> {
        let epoch = self.epoch();

        let (removed, before, after) = {
            let mut state = self.state();
            let before = state.unread_count;
            let removed = state.apply_remove(id);
            (removed, before, state.unread_count)
        };
        if removed.is_none() {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        self.publish_count_change(before, after);

        let Err(e) = self.inner.api.delete(id).await else {
            return Ok(());
        };

        tracing::warn!("Failed to delete notification {}, resyncing: {}", id, e);
        self.resync_after_failure(epoch, &e).await;
        Err(e)
    }

    async fn resync_after_failure(&self, epoch: u64, cause: &AppError) {
        if !self.is_current(epoch) {
            return;
        }
        self.fetch_all().await;
        if self.is_current(epoch) {
            self.state().error = Some(cause.message.clone());
        }
    }

    // ── Alerts ───────────────────────────────────────────────────

    /// Ask the platform for alert permission. Denial only turns off the
    /// alert side channel.
    pub async fn request_permission(&self) -> AlertPermission {
        self.inner.alerts.request_permission().await
    }

    /// Publish events and alerts for new notifications, one per stagger
    /// step, in server order.
    fn dispatch_arrivals(&self, arrivals: Vec<Notification>, epoch: u64) {
        let engine = self.clone();
        tokio::spawn(async move {
            let stagger = engine.inner.alerts.stagger();
            for (index, notification) in arrivals.into_iter().enumerate() {
                if index > 0 && !stagger.is_zero() {
                    tokio::time::sleep(stagger).await;
                }
                if !engine.is_current(epoch) {
                    break;
                }
                engine
                    .inner
                    .bus
                    .publish(NotificationEvent::received(notification.clone()));
                engine.inner.alerts.alert(&notification).await;
            }
        });
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Mount the engine.
    ///
    /// Without a session the engine stays idle. With one, the unread count
    /// is fetched once and the poll timer starts at the floor interval.
    /// Calling `start` while already polling does nothing.
    pub async fn start(&self) -> PollerState {
        if !self.inner.credentials.has_session() {
            tracing::info!("No active session; notification polling stays idle");
            return PollerState::Idle;
        }

        let cancel = {
            let mut poller = lock(&self.inner.poller);
            if poller.is_some() {
                return PollerState::Polling;
            }
            let cancel = CancellationToken::new();
            *poller = Some(PollerHandle {
                cancel: cancel.clone(),
            });
            cancel
        };

        lock(&self.inner.interval).reset();
        self.fetch_unread_count().await;

        tokio::spawn(scheduler::run_poll_loop(self.clone(), cancel));
        tracing::info!(
            interval_ms = self.poll_interval_ms(),
            "Notification polling started"
        );
        PollerState::Polling
    }

    /// Feed page visibility/focus signals from `events` until teardown.
    ///
    /// Returns `false` (and drops the receiver) when the engine is idle.
    pub fn attach_page_events(&self, events: mpsc::Receiver<PageEvent>) -> bool {
        let cancel = match lock(&self.inner.poller).as_ref() {
            Some(handle) => handle.cancel.child_token(),
            None => return false,
        };
        tokio::spawn(scheduler::run_page_listener(self.clone(), events, cancel));
        true
    }

    /// Apply one page signal.
    ///
    /// Hidden jumps the interval to the ceiling. Visible and focus jump it
    /// to the floor and start an immediate poll, whose handle is returned.
    /// Ignored while idle.
    pub fn handle_page_event(&self, event: PageEvent) -> Option<JoinHandle<()>> {
        if self.poller_state() == PollerState::Idle {
            return None;
        }

        let interval_ms = {
            let mut interval = lock(&self.inner.interval);
            if event.is_engagement() {
                interval.on_engaged()
            } else {
                interval.on_hidden()
            }
        };
        tracing::debug!(?event, interval_ms, "Page event");

        if !event.is_engagement() {
            return None;
        }

        let engine = self.clone();
        Some(tokio::spawn(async move { engine.poll_for_updates().await }))
    }

    /// Unmount: stop the timer, detach listeners, and clear local state.
    ///
    /// Safe to call repeatedly and from the idle state. Requests still in
    /// flight complete but their results are discarded.
    pub fn teardown(&self) {
        if let Some(handle) = lock(&self.inner.poller).take() {
            handle.cancel.cancel();
            tracing::info!("Notification polling stopped");
        }

        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        *self.state() = SyncState::default();
        lock(&self.inner.interval).reset();
    }

    // ── Internals ────────────────────────────────────────────────

    fn state(&self) -> MutexGuard<'_, SyncState> {
        lock(&self.inner.state)
    }

    fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch() == epoch
    }

    fn publish_count_change(&self, before: u64, after: u64) {
        if before != after {
            self.inner
                .bus
                .publish(NotificationEvent::UnreadCountChanged { count: after });
        }
    }
}
