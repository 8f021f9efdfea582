//! Integration tests for the sync engine's state rules.

use std::sync::Arc;
use std::time::Duration;

use eventsphere_core::config::NewItemDetection;
use eventsphere_core::error::ErrorKind;
use eventsphere_core::traits::StaticCredentials;
use eventsphere_core::types::NotificationId;
use eventsphere_entity::notification::count_unread;
use eventsphere_entity::{Notification, NotificationKind};
use eventsphere_realtime::{NotificationEvent, NotificationSyncEngine, PageEvent, PollerState};

use crate::helpers::{self, FakeAlerts, FakeApi, inbox, notification};

fn id(value: &str) -> NotificationId {
    NotificationId::from(value)
}

fn read_flag(engine: &NotificationSyncEngine, value: &str) -> Option<bool> {
    engine
        .notifications()
        .into_iter()
        .find(|n| n.id.as_str() == value)
        .map(|n| n.read)
}

#[tokio::test]
async fn test_fetch_all_counts_unread() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));

    assert!(engine.notifications().is_empty());
    assert_eq!(engine.unread_count(), 0);

    engine.fetch_all().await;

    assert_eq!(engine.notifications().len(), 3);
    assert_eq!(engine.unread_count(), 2);
    assert_eq!(engine.unread_count(), count_unread(&engine.notifications()));
    assert!(engine.error().is_none());
    assert!(!engine.snapshot().loading);
}

#[tokio::test]
async fn test_fetch_failure_before_first_load_empties_view() {
    let api = FakeApi::with_server(inbox());
    api.fail_list(true);
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));

    engine.fetch_all().await;

    assert!(engine.notifications().is_empty());
    assert_eq!(engine.unread_count(), 0);
    assert_eq!(engine.error().as_deref(), Some("Backend unavailable"));
}

#[tokio::test]
async fn test_fetch_failure_after_load_keeps_last_good_view() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    api.fail_list(true);
    engine.fetch_all().await;

    assert_eq!(engine.notifications().len(), 3);
    assert_eq!(engine.unread_count(), 2);
    assert!(engine.error().is_some());

    api.fail_list(false);
    engine.fetch_all().await;
    assert!(engine.error().is_none());
}

#[tokio::test]
async fn test_mark_as_read_applies_and_persists() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    engine.mark_as_read(&id("3")).await.unwrap();

    assert_eq!(read_flag(&engine, "3"), Some(true));
    assert_eq!(engine.unread_count(), 1);
    assert!(api.server()[0].read);
}

#[tokio::test]
async fn test_mark_as_read_rolls_back_on_rejection() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;
    let before = engine.notifications();

    api.fail_mutations(true);
    let err = engine.mark_as_read(&id("3")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert_eq!(engine.notifications(), before);
    assert_eq!(engine.unread_count(), 2);
    assert_eq!(engine.error().as_deref(), Some("Server error"));
}

#[tokio::test]
async fn test_mark_as_read_is_optimistic() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    let release = api.gate_mutation();
    let task = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.mark_as_read(&id("1")).await })
    };
    helpers::wait_until(|| api.calls().mark_read == 1).await;

    assert_eq!(read_flag(&engine, "1"), Some(true));
    assert_eq!(engine.unread_count(), 1);

    release.send(()).unwrap();
    task.await.unwrap().unwrap();
    assert_eq!(engine.unread_count(), 1);
}

#[tokio::test]
async fn test_mark_as_read_guards() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    // Already read: nothing to send.
    engine.mark_as_read(&id("2")).await.unwrap();
    assert_eq!(api.calls().mark_read, 0);

    let err = engine.mark_as_read(&id("missing")).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(engine.unread_count(), 2);
}

#[tokio::test]
async fn test_concurrent_mark_reads_roll_back_independently() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    let release = api.gate_mutation();
    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.mark_as_read(&id("3")).await })
    };
    helpers::wait_until(|| api.calls().mark_read == 1).await;

    engine.mark_as_read(&id("1")).await.unwrap();
    assert_eq!(engine.unread_count(), 0);

    api.fail_mutations(true);
    release.send(()).unwrap();
    assert!(first.await.unwrap().is_err());

    assert_eq!(read_flag(&engine, "3"), Some(false));
    assert_eq!(read_flag(&engine, "1"), Some(true));
    assert_eq!(engine.unread_count(), 1);
}

#[tokio::test]
async fn test_failed_mark_read_after_poll_keeps_count_consistent() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    let release = api.gate_mutation();
    api.fail_mutations(true);
    let task = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.mark_as_read(&id("3")).await })
    };
    helpers::wait_until(|| api.calls().mark_read == 1).await;
    assert_eq!(engine.unread_count(), 1);

    // The server still holds "3" unread, and the poll lands first.
    engine.poll_for_updates().await;
    assert_eq!(engine.unread_count(), 2);

    release.send(()).unwrap();
    assert!(task.await.unwrap().is_err());

    assert_eq!(read_flag(&engine, "3"), Some(false));
    assert_eq!(engine.unread_count(), 2);
    assert_eq!(engine.unread_count(), count_unread(&engine.notifications()));
}

#[tokio::test]
async fn test_unread_count_refresh_clears_error() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));

    api.fail_list(true);
    engine.fetch_unread_count().await;
    assert!(engine.error().is_some());

    api.fail_list(false);
    engine.fetch_unread_count().await;
    assert!(engine.error().is_none());
    assert_eq!(engine.unread_count(), 2);
}

#[tokio::test]
async fn test_mark_all_as_read_is_optimistic_and_resyncs_on_failure() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;
    assert_eq!(engine.unread_count(), 2);

    let release = api.gate_mutation();
    let task = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.mark_all_as_read().await })
    };
    helpers::wait_until(|| api.calls().mark_all_read == 1).await;

    assert_eq!(engine.unread_count(), 0);
    assert!(engine.notifications().iter().all(|n| n.read));

    // Meanwhile another client read "3" and a new one arrived.
    api.set_server(vec![
        notification("4", false),
        notification("3", true),
        notification("2", true),
        notification("1", false),
    ]);
    api.fail_mutations(true);
    let lists_before = api.calls().list;
    release.send(()).unwrap();

    assert!(task.await.unwrap().is_err());
    assert_eq!(api.calls().list, lists_before + 1);
    assert_eq!(engine.notifications(), api.server());
    assert_eq!(engine.unread_count(), 2);
    assert_eq!(engine.error().as_deref(), Some("Server error"));
}

#[tokio::test]
async fn test_delete_accounting() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    engine.delete_notification(&id("2")).await.unwrap();
    assert_eq!(engine.unread_count(), 2);

    engine.delete_notification(&id("3")).await.unwrap();
    assert_eq!(engine.unread_count(), 1);

    assert_eq!(engine.notifications().len(), 1);
    assert_eq!(api.server().len(), 1);

    let err = engine.delete_notification(&id("3")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_failure_resyncs() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    api.fail_mutations(true);
    assert!(engine.delete_notification(&id("1")).await.is_err());

    assert_eq!(engine.notifications(), inbox());
    assert_eq!(engine.unread_count(), 2);
    assert!(engine.error().is_some());
}

#[tokio::test]
async fn test_last_resolved_poll_wins() {
    let api = FakeApi::with_server(Vec::new());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));

    let first_gate = api.gate_list();
    let second_gate = api.gate_list();

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.poll_for_updates().await })
    };
    helpers::wait_until(|| api.calls().list == 1).await;
    let second = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.poll_for_updates().await })
    };
    helpers::wait_until(|| api.calls().list == 2).await;
    assert!(engine.snapshot().loading);

    let l1 = vec![notification("a", false)];
    let l2 = vec![notification("b", true), notification("a", false)];

    second_gate.send(Ok(l2.clone())).unwrap();
    second.await.unwrap();
    assert_eq!(engine.notifications(), l2);

    first_gate.send(Ok(l1.clone())).unwrap();
    first.await.unwrap();
    assert_eq!(engine.notifications(), l1);
    assert_eq!(engine.unread_count(), 1);
    assert!(!engine.snapshot().loading);
}

#[tokio::test]
async fn test_stale_poll_overwrites_optimistic_read() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));
    engine.fetch_all().await;

    let gate = api.gate_list();
    let poll = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.poll_for_updates().await })
    };
    helpers::wait_until(|| api.calls().list == 2).await;

    engine.mark_as_read(&id("3")).await.unwrap();
    assert_eq!(engine.unread_count(), 1);

    gate.send(Ok(inbox())).unwrap();
    poll.await.unwrap();

    assert_eq!(read_flag(&engine, "3"), Some(false));
    assert_eq!(engine.unread_count(), 2);
}

#[tokio::test]
async fn test_results_after_teardown_are_discarded() {
    let api = FakeApi::with_server(Vec::new());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));

    let gate = api.gate_list();
    let fetch = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.fetch_all().await })
    };
    helpers::wait_until(|| api.calls().list == 1).await;

    engine.teardown();
    gate.send(Ok(inbox())).unwrap();
    fetch.await.unwrap();

    assert!(engine.notifications().is_empty());
    assert_eq!(engine.unread_count(), 0);
    assert!(!engine.snapshot().loading);
}

#[tokio::test]
async fn test_new_arrivals_raise_events_and_alerts() {
    let api = FakeApi::with_server(inbox());
    let alerts = Arc::new(FakeAlerts::default());
    let engine = helpers::engine(&api, &alerts);
    engine.request_permission().await;
    let mut events = engine.subscribe();

    // Baseline load is not news.
    engine.poll_for_updates().await;
    assert!(matches!(
        events.recv().await.unwrap(),
        NotificationEvent::UnreadCountChanged { count: 2 }
    ));
    assert!(alerts.emitted().is_empty());

    let mut arrival = Notification::new("4", NotificationKind::AdminResponse, "", "Approved");
    arrival.sender_role = Some("admin".into());
    let mut server = vec![arrival];
    server.extend(inbox());
    api.set_server(server);

    let interval_before = engine.poll_interval_ms();
    engine.poll_for_updates().await;
    assert_eq!(engine.poll_interval_ms(), interval_before);

    assert!(matches!(
        events.recv().await.unwrap(),
        NotificationEvent::UnreadCountChanged { count: 3 }
    ));
    match events.recv().await.unwrap() {
        NotificationEvent::Received { notification, .. } => {
            assert_eq!(notification.id.as_str(), "4");
        }
        other => panic!("unexpected event {other:?}"),
    }

    helpers::wait_until(|| alerts.emitted().len() == 1).await;
    let (title, body) = &alerts.emitted()[0];
    assert_eq!(title, "Admin response");
    assert!(body.starts_with("Approved"));
}

async fn assert_no_arrivals(
    engine: &NotificationSyncEngine,
    events: &mut tokio::sync::broadcast::Receiver<NotificationEvent>,
    alerts: &FakeAlerts,
) {
    // Give any spawned alert burst a chance to run.
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(event, NotificationEvent::Received { .. }),
            "unexpected arrival {event:?}"
        );
    }
    assert!(alerts.emitted().is_empty());
    assert!(engine.error().is_none());
}

#[tokio::test]
async fn test_poll_during_pending_delete_is_not_an_arrival() {
    for detection in [NewItemDetection::Identity, NewItemDetection::Length] {
        let api = FakeApi::with_server(inbox());
        let alerts = Arc::new(FakeAlerts::default());
        let mut config = helpers::test_config();
        config.polling.detection = detection;
        let engine = helpers::engine_with(&api, &alerts, &config);
        engine.request_permission().await;
        engine.poll_for_updates().await;
        let mut events = engine.subscribe();

        let release = api.gate_mutation();
        let task = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.delete_notification(&id("1")).await })
        };
        helpers::wait_until(|| api.calls().delete == 1).await;

        // The server has not applied the delete yet.
        engine.poll_for_updates().await;

        release.send(()).unwrap();
        task.await.unwrap().unwrap();

        assert_no_arrivals(&engine, &mut events, &alerts).await;
    }
}

#[tokio::test]
async fn test_poll_after_mark_all_read_is_not_an_arrival() {
    let api = FakeApi::with_server(inbox());
    let alerts = Arc::new(FakeAlerts::default());
    let engine = helpers::engine(&api, &alerts);
    engine.request_permission().await;
    engine.poll_for_updates().await;
    let mut events = engine.subscribe();

    engine.mark_all_as_read().await.unwrap();
    engine.poll_for_updates().await;

    assert_no_arrivals(&engine, &mut events, &alerts).await;
    assert_eq!(engine.unread_count(), 0);
}

#[tokio::test]
async fn test_length_detection_ignores_same_size_swaps() {
    let api = FakeApi::with_server(vec![notification("1", false)]);
    let alerts = Arc::new(FakeAlerts::default());
    let mut config = helpers::test_config();
    config.polling.detection = NewItemDetection::Length;
    let engine = helpers::engine_with(&api, &alerts, &config);
    engine.request_permission().await;

    engine.poll_for_updates().await;
    api.set_server(vec![notification("2", false)]);
    engine.poll_for_updates().await;

    api.set_server(vec![notification("3", false), notification("2", false)]);
    engine.poll_for_updates().await;

    helpers::wait_until(|| alerts.emitted().len() == 1).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(alerts.emitted().len(), 1);
}

#[tokio::test]
async fn test_poll_backoff_is_clamped() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));

    for _ in 0..50 {
        engine.poll_for_updates().await;
        assert!(engine.poll_interval_ms() <= 30_000);
    }
    assert_eq!(engine.poll_interval_ms(), 30_000);
    assert!(engine.snapshot().last_poll_time.is_some());

    api.fail_list(true);
    for _ in 0..50 {
        engine.poll_for_updates().await;
        assert!(engine.poll_interval_ms() >= 5_000);
    }
    assert_eq!(engine.poll_interval_ms(), 5_000);
    // Failures keep the last good view.
    assert_eq!(engine.notifications().len(), 3);
}

#[tokio::test]
async fn test_no_session_stays_idle() {
    let api = FakeApi::with_server(inbox());
    let engine = NotificationSyncEngine::new(
        api.clone(),
        Arc::new(StaticCredentials::anonymous()),
        Arc::new(FakeAlerts::default()),
        &helpers::test_config(),
    );

    assert_eq!(engine.start().await, PollerState::Idle);
    assert!(engine.handle_page_event(PageEvent::Focus).is_none());

    let (_tx, rx) = tokio::sync::mpsc::channel(1);
    assert!(!engine.attach_page_events(rx));

    assert_eq!(api.calls().total(), 0);
    assert_eq!(engine.poller_state(), PollerState::Idle);
}

#[tokio::test]
async fn test_teardown_is_idempotent() {
    let api = FakeApi::with_server(inbox());
    let engine = helpers::engine(&api, &Arc::new(FakeAlerts::default()));

    engine.teardown();
    assert_eq!(engine.poller_state(), PollerState::Idle);

    assert_eq!(engine.start().await, PollerState::Polling);
    engine.fetch_all().await;

    engine.teardown();
    assert_eq!(engine.poller_state(), PollerState::Idle);
    engine.teardown();
    assert_eq!(engine.poller_state(), PollerState::Idle);

    assert!(engine.notifications().is_empty());
    assert_eq!(engine.unread_count(), 0);
    assert_eq!(engine.poll_interval_ms(), 5_000);
}
