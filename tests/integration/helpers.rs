//! Shared test helpers for integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use eventsphere_client::NotificationApi;
use eventsphere_core::config::AppConfig;
use eventsphere_core::error::AppError;
use eventsphere_core::result::AppResult;
use eventsphere_core::traits::{AlertPermission, AlertPort, StaticCredentials};
use eventsphere_core::types::NotificationId;
use eventsphere_entity::notification::count_unread;
use eventsphere_entity::{Notification, NotificationKind};
use eventsphere_realtime::NotificationSyncEngine;

/// Build a notification for fixtures.
pub fn notification(id: &str, read: bool) -> Notification {
    Notification::new(id, NotificationKind::StatusUpdate, format!("Update {id}"), "body")
        .with_read(read)
}

/// Three notifications, two unread, newest first.
pub fn inbox() -> Vec<Notification> {
    vec![
        notification("3", false),
        notification("2", true),
        notification("1", false),
    ]
}

/// Per-endpoint call counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Calls {
    pub list: usize,
    pub unread_count: usize,
    pub mark_read: usize,
    pub mark_all_read: usize,
    pub delete: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.list + self.unread_count + self.mark_read + self.mark_all_read + self.delete
    }
}

type ListReply = AppResult<Vec<Notification>>;

#[derive(Debug, Default)]
struct FakeState {
    server: Vec<Notification>,
    fail_list: bool,
    fail_mutations: bool,
    list_gates: VecDeque<oneshot::Receiver<ListReply>>,
    mutation_gate: Option<oneshot::Receiver<()>>,
    calls: Calls,
}

/// Scripted in-memory backend.
///
/// Without gates every call resolves immediately against `server`. A list
/// gate makes the next `list` call wait for whatever reply the test sends;
/// a mutation gate holds the next mutation until released.
#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with_server(server: Vec<Notification>) -> Arc<Self> {
        let api = Self::default();
        api.state.lock().unwrap().server = server;
        Arc::new(api)
    }

    pub fn set_server(&self, server: Vec<Notification>) {
        self.state.lock().unwrap().server = server;
    }

    pub fn server(&self) -> Vec<Notification> {
        self.state.lock().unwrap().server.clone()
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.state.lock().unwrap().fail_mutations = fail;
    }

    /// Queue a gate for the next ungated `list` call.
    pub fn gate_list(&self) -> oneshot::Sender<ListReply> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().list_gates.push_back(rx);
        tx
    }

    /// Hold the next mutation until the returned sender fires.
    pub fn gate_mutation(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().mutation_gate = Some(rx);
        tx
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    async fn mutation(&self, apply: impl FnOnce(&mut Vec<Notification>)) -> AppResult<()> {
        let gate = self.state.lock().unwrap().mutation_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut state = self.state.lock().unwrap();
        if state.fail_mutations {
            return Err(AppError::from_status(500, "Server error"));
        }
        apply(&mut state.server);
        Ok(())
    }
}

#[async_trait]
impl NotificationApi for FakeApi {
    async fn list(&self) -> AppResult<Vec<Notification>> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.calls.list += 1;
            state.list_gates.pop_front()
        };
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(AppError::internal("gate dropped")));
        }

        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(AppError::service_unavailable("Backend unavailable"));
        }
        Ok(state.server.clone())
    }

    async fn list_unread(&self) -> AppResult<Vec<Notification>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(Notification::is_unread)
            .collect())
    }

    async fn unread_count(&self) -> AppResult<u64> {
        let mut state = self.state.lock().unwrap();
        state.calls.unread_count += 1;
        if state.fail_list {
            return Err(AppError::service_unavailable("Backend unavailable"));
        }
        Ok(count_unread(&state.server))
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        self.state.lock().unwrap().calls.mark_read += 1;
        let id = id.clone();
        self.mutation(move |server| {
            if let Some(n) = server.iter_mut().find(|n| n.id == id) {
                n.read = true;
            }
        })
        .await
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        self.state.lock().unwrap().calls.mark_all_read += 1;
        self.mutation(|server| server.iter_mut().for_each(|n| n.read = true))
            .await
    }

    async fn delete(&self, id: &NotificationId) -> AppResult<()> {
        self.state.lock().unwrap().calls.delete += 1;
        let id = id.clone();
        self.mutation(move |server| server.retain(|n| n.id != id))
            .await
    }
}

/// Alert port that grants permission and records every alert.
#[derive(Debug, Default)]
pub struct FakeAlerts {
    emitted: Mutex<Vec<(String, String)>>,
}

impl FakeAlerts {
    pub fn emitted(&self) -> Vec<(String, String)> {
        self.emitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertPort for FakeAlerts {
    async fn request_permission(&self) -> AppResult<AlertPermission> {
        Ok(AlertPermission::Granted)
    }

    async fn emit(&self, title: &str, body: &str) -> AppResult<()> {
        self.emitted
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Default configuration with alerts delivered without stagger.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.alerts.stagger_ms = 0;
    config
}

/// Engine wired to the fakes with a signed-in session.
pub fn engine(api: &Arc<FakeApi>, alerts: &Arc<FakeAlerts>) -> NotificationSyncEngine {
    engine_with(api, alerts, &test_config())
}

pub fn engine_with(
    api: &Arc<FakeApi>,
    alerts: &Arc<FakeAlerts>,
    config: &AppConfig,
) -> NotificationSyncEngine {
    NotificationSyncEngine::new(
        api.clone(),
        Arc::new(StaticCredentials::new("test-token")),
        alerts.clone(),
        config,
    )
}

/// Let spawned tasks run until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
