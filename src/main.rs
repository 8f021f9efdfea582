//! EventSphere Notifier: background notification sync daemon
//!
//! Polls the EventSphere backend for the signed-in user's notifications,
//! raises terminal alerts for new arrivals, and logs every local event.
//! Page signals (`hidden`, `visible`, `focus`) are read line by line from
//! stdin so a host UI can drive the adaptive interval.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::{EnvFilter, fmt};

use eventsphere_client::{HttpNotificationApi, credentials_from_config};
use eventsphere_core::config::AppConfig;
use eventsphere_core::error::AppError;
use eventsphere_realtime::{NotificationEvent, NotificationSyncEngine, PageEvent, PollerState};

mod alerts;

use alerts::TerminalAlertPort;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Notifier error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("EVENTSPHERE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("EVENTSPHERE_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EventSphere Notifier v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Backend: {}", config.api.base_url);

    let credentials = credentials_from_config(&config.api);
    let api = HttpNotificationApi::new(&config.api, Arc::clone(&credentials))?;
    let engine = NotificationSyncEngine::new(
        Arc::new(api),
        credentials,
        Arc::new(TerminalAlertPort),
        &config,
    );

    let events = engine.subscribe();
    let logger = tokio::spawn(log_events(events));

    let permission = engine.request_permission().await;
    tracing::info!(?permission, "Alert permission");

    let state = engine.start().await;
    tracing::info!(state = state.as_str(), "Engine mounted");
    if state == PollerState::Idle {
        return Err(AppError::authentication(
            "No session token: set api.token, api.token_file, or EVENTSPHERE_TOKEN",
        ));
    }

    let (page_tx, page_rx) = mpsc::channel(16);
    engine.attach_page_events(page_rx);
    let stdin_reader = tokio::spawn(read_page_events(page_tx));

    engine.fetch_all().await;
    if let Some(error) = engine.error() {
        tracing::warn!("Initial load failed: {}", error);
    } else {
        tracing::info!(
            total = engine.notifications().len(),
            unread = engine.unread_count(),
            "Inbox loaded"
        );
    }

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");

    engine.teardown();
    stdin_reader.abort();
    logger.abort();

    tracing::info!("EventSphere Notifier stopped");
    Ok(())
}

/// Forward page signals typed on stdin to the engine.
async fn read_page_events(tx: mpsc::Sender<PageEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match line.parse::<PageEvent>() {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("Ignoring input: {}", e),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("stdin closed: {}", e);
                break;
            }
        }
    }
}

/// Log every local event published by the engine.
async fn log_events(mut events: broadcast::Receiver<NotificationEvent>) {
    loop {
        match events.recv().await {
            Ok(NotificationEvent::Received { notification, .. }) => {
                tracing::info!(
                    id = %notification.id,
                    kind = %notification.kind,
                    "New notification: {}",
                    notification.title
                );
            }
            Ok(NotificationEvent::UnreadCountChanged { count }) => {
                tracing::info!(count, "Unread count changed");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event logger lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
