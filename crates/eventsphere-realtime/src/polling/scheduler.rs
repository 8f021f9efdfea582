//! Poll timer and page-signal listener tasks.

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::sync::NotificationSyncEngine;

use super::page::PageEvent;

/// Run the poll timer until `cancel` fires.
///
/// Each iteration sleeps for whatever the interval is *now*, then fires a
/// poll without waiting for it, so a slow poll never delays the next tick
/// and interval changes apply from the following tick on.
pub(crate) async fn run_poll_loop(engine: NotificationSyncEngine, cancel: CancellationToken) {
    loop {
        let delay = engine.current_interval();

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = time::sleep(delay) => {}
        }

        tracing::trace!("Poll tick after {:?}", delay);

        let engine = engine.clone();
        tokio::spawn(async move { engine.poll_for_updates().await });
    }

    tracing::debug!("Poll loop stopped");
}

/// Forward page signals to the engine until `cancel` fires or the sender
/// side is dropped.
pub(crate) async fn run_page_listener(
    engine: NotificationSyncEngine,
    mut events: mpsc::Receiver<PageEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Some(event) => {
                engine.handle_page_event(event);
            }
            None => break,
        }
    }

    tracing::debug!("Page listener detached");
}
