//! CLI command definitions and dispatch.

pub mod config;
pub mod notifications;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use eventsphere_client::{HttpNotificationApi, credentials_from_config};
use eventsphere_core::config::AppConfig;
use eventsphere_core::error::AppError;
use eventsphere_core::traits::NoopAlertPort;
use eventsphere_realtime::NotificationSyncEngine;

use crate::output::OutputFormat;

/// EventSphere: notification inbox from the terminal
#[derive(Debug, Parser)]
#[command(name = "eventsphere-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (`config/<env>.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Configuration directory
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List notifications
    List(notifications::ListArgs),
    /// Show the unread count
    Count,
    /// Mark one notification as read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark all notifications as read
    ReadAll {
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Delete a notification
    Delete {
        /// Notification ID
        id: String,
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config_dir, &self.env)?;

        match &self.command {
            Commands::Config(args) => config::execute(args, &config),
            Commands::List(args) => notifications::list(args, &config, self.format).await,
            Commands::Count => notifications::count(&config, self.format).await,
            Commands::Read { id } => notifications::read(id, &config).await,
            Commands::ReadAll { yes } => notifications::read_all(*yes, &config).await,
            Commands::Delete { id, yes } => notifications::delete(id, *yes, &config).await,
        }
    }
}

/// Helper: build an engine against the configured backend.
///
/// Fails early when there is no session token, since every endpoint
/// requires one.
pub fn build_engine(config: &AppConfig) -> Result<NotificationSyncEngine, AppError> {
    let credentials = credentials_from_config(&config.api);
    if !credentials.has_session() {
        return Err(AppError::authentication(
            "No session token: set api.token, api.token_file, or EVENTSPHERE_TOKEN",
        ));
    }

    tracing::debug!("Using backend {}", config.api.base_url);
    let api = HttpNotificationApi::new(&config.api, Arc::clone(&credentials))?;
    Ok(NotificationSyncEngine::new(
        Arc::new(api),
        credentials,
        Arc::new(NoopAlertPort),
        config,
    ))
}

/// Helper: ask for confirmation unless `skip` is set.
pub fn confirm(prompt: &str, skip: bool) -> Result<bool, AppError> {
    if skip {
        return Ok(true);
    }

    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}
