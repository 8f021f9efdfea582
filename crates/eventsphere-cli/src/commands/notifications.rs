//! Notification inbox commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use eventsphere_core::config::AppConfig;
use eventsphere_core::error::{AppError, ErrorKind};
use eventsphere_core::types::NotificationId;
use eventsphere_entity::Notification;
use eventsphere_realtime::NotificationSyncEngine;

use crate::output::{self, OutputFormat};

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show unread notifications
    #[arg(long)]
    pub unread: bool,
}

/// Row for the notification table
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Read")]
    read: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            kind: n.kind.as_str().to_string(),
            title: n.title.clone(),
            read: if n.read { "✓" } else { "✗" }.to_string(),
            from: n.sender_role.clone().unwrap_or_default(),
            created: n
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Mount an engine and load the inbox once.
async fn load(config: &AppConfig) -> Result<NotificationSyncEngine, AppError> {
    let engine = super::build_engine(config)?;
    engine.fetch_all().await;

    if let Some(message) = engine.error() {
        return Err(AppError::new(ErrorKind::ExternalService, message));
    }
    Ok(engine)
}

/// `list [--unread]`
pub async fn list(
    args: &ListArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = load(config).await?;

    let items: Vec<Notification> = engine
        .notifications()
        .into_iter()
        .filter(|n| !args.unread || n.is_unread())
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Table => {
            let rows: Vec<NotificationRow> = items.iter().map(NotificationRow::from).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}

/// `count`
pub async fn count(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let engine = super::build_engine(config)?;
    engine.fetch_unread_count().await;

    if let Some(message) = engine.error() {
        return Err(AppError::new(ErrorKind::ExternalService, message));
    }
    output::print_item(&engine.unread_count(), format);
    Ok(())
}

/// `read <ID>`
pub async fn read(id: &str, config: &AppConfig) -> Result<(), AppError> {
    let engine = load(config).await?;
    let id = NotificationId::from(id);

    if !engine.notifications().iter().any(|n| n.id == id) {
        return Err(AppError::not_found(format!("Notification {} not found", id)));
    }

    engine.mark_as_read(&id).await?;
    output::print_success(&format!(
        "Marked {} as read ({} unread left)",
        id,
        engine.unread_count()
    ));
    Ok(())
}

/// `read-all [--yes]`
pub async fn read_all(yes: bool, config: &AppConfig) -> Result<(), AppError> {
    let engine = load(config).await?;
    let unread = engine.unread_count();

    if unread == 0 {
        output::print_success("Nothing to mark");
        return Ok(());
    }

    if !super::confirm(&format!("Mark {} notifications as read?", unread), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    engine.mark_all_as_read().await?;
    output::print_success(&format!("Marked {} notifications as read", unread));
    Ok(())
}

/// `delete <ID> [--yes]`
pub async fn delete(id: &str, yes: bool, config: &AppConfig) -> Result<(), AppError> {
    let engine = load(config).await?;
    let id = NotificationId::from(id);

    let Some(target) = engine.notifications().into_iter().find(|n| n.id == id) else {
        return Err(AppError::not_found(format!("Notification {} not found", id)));
    };

    if !super::confirm(&format!("Delete \"{}\"?", target.title), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    engine.delete_notification(&id).await?;
    output::print_success(&format!("Notification {} deleted", id));
    Ok(())
}
