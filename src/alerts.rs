//! Terminal-backed platform alerts.

use std::io::{IsTerminal, Write};

use async_trait::async_trait;

use eventsphere_core::result::AppResult;
use eventsphere_core::traits::{AlertPermission, AlertPort};

/// Rings the terminal bell and prints a one-line alert to stderr.
///
/// Permission is granted only when stderr is attached to a terminal, so
/// piping the daemon's output into a file never produces bell characters.
#[derive(Debug, Default)]
pub struct TerminalAlertPort;

#[async_trait]
impl AlertPort for TerminalAlertPort {
    async fn request_permission(&self) -> AppResult<AlertPermission> {
        if std::io::stderr().is_terminal() {
            Ok(AlertPermission::Granted)
        } else {
            Ok(AlertPermission::Denied)
        }
    }

    async fn emit(&self, title: &str, body: &str) -> AppResult<()> {
        writeln!(std::io::stderr(), "\x07🔔 {}: {}", title, body)?;
        Ok(())
    }
}
