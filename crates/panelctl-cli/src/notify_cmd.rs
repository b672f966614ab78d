//! Notification subcommands.

use std::io::{self, Write};

use clap::Subcommand;

use panelctl_client::api::Gateway;
use panelctl_client::Orchestrator;

use crate::output::{short_date, truncate};

/// Notification subcommand actions.
#[derive(Subcommand, Debug)]
pub enum NotifyAction {
    /// List notifications for the current session
    List,
    /// Send a notification to an account (admin and above)
    Send {
        /// Target account id
        user_id: u64,
        message: String,
    },
    /// Mark a notification as read
    Read {
        /// Notification id
        id: u64,
    },
}

/// Execute a notification subcommand.
pub async fn run<G: Gateway>(
    orch: &mut Orchestrator<G>,
    action: NotifyAction,
) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        NotifyAction::List => {
            let Some(notifications) = orch.notifications().loaded() else {
                writeln!(out, "Notifications not loaded.")?;
                return Ok(());
            };
            if notifications.is_empty() {
                writeln!(out, "No notifications.")?;
                return Ok(());
            }
            writeln!(out, "{:>6}  {:<12}  {:<6}  MESSAGE", "ID", "DATE", "READ")?;
            for n in notifications {
                writeln!(
                    out,
                    "{:>6}  {:<12}  {:<6}  {}",
                    n.id,
                    short_date(Some(&n.timestamp)),
                    if n.is_read { "read" } else { "new" },
                    truncate(&n.message, 60),
                )?;
            }
        }
        NotifyAction::Send { user_id, message } => {
            orch.create_notification(user_id, &message).await?;
            writeln!(out, "Notification sent to account {user_id}.")?;
        }
        NotifyAction::Read { id } => {
            orch.mark_notification_read(id).await?;
            writeln!(out, "Notification {id} marked read.")?;
        }
    }
    Ok(())
}
