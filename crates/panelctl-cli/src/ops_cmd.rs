//! Reports, audit log, backup, 2FA, password, and subscription commands.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Subcommand;

use panelctl_client::api::Gateway;
use panelctl_client::{LoadState, Orchestrator};
use panelctl_core::policy::Action;

use crate::output::{short_date, truncate, yes_no};

/// Backup subcommand actions.
#[derive(Subcommand, Debug)]
pub enum BackupAction {
    /// Trigger a backup export on the panel
    Create,
    /// Upload a backup file and restore it
    Restore {
        /// Path to a previously exported backup file
        file: PathBuf,
    },
}

/// Show the current session account and what it may do.
pub fn whoami<G: Gateway>(orch: &Orchestrator<G>) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let LoadState::Loaded(me) = orch.profile() else {
        writeln!(out, "No session.")?;
        return Ok(());
    };
    writeln!(out, "  Account:  {}", me.username)?;
    writeln!(out, "  Role:     {}", me.role)?;
    writeln!(out, "  Uuid:     {}", me.uuid)?;
    if let Some(expiry) = me.expiry_date.as_deref() {
        writeln!(out, "  Expires:  {}", short_date(Some(expiry)))?;
    }
    writeln!(out, "  Active:   {}", yes_no(me.is_active))?;
    writeln!(
        out,
        "  Can:      manage accounts: {}, manage servers: {}, audit log: {}",
        yes_no(orch.can(&Action::DeleteAccount)),
        yes_no(orch.can(&Action::ViewServers)),
        yes_no(orch.can(&Action::ViewAuditLog)),
    )?;
    Ok(())
}

/// Print the report snapshot.
pub fn reports<G: Gateway>(orch: &Orchestrator<G>) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let Some(report) = orch.reports().loaded() else {
        writeln!(out, "Reports not loaded.")?;
        return Ok(());
    };
    writeln!(out, "  Total traffic:  {:.2} GB", report.total_traffic_used_gb)?;
    writeln!(out, "  Active users:   {}", report.active_users)?;
    writeln!(out, "  Online users:   {}", report.online_users)?;
    if !report.daily_traffic.is_empty() {
        writeln!(out, "  Daily traffic:")?;
        for (date, count) in &report.daily_traffic {
            writeln!(out, "    {date}  {count}")?;
        }
    }
    Ok(())
}

/// Print the audit log.
pub fn logs<G: Gateway>(orch: &Orchestrator<G>) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let Some(entries) = orch.logs().loaded() else {
        writeln!(out, "Audit log not loaded.")?;
        return Ok(());
    };
    if entries.is_empty() {
        writeln!(out, "Audit log is empty.")?;
        return Ok(());
    }
    writeln!(out, "{:<12}  {:>8}  ACTION", "DATE", "USER")?;
    for entry in entries {
        writeln!(
            out,
            "{:<12}  {:>8}  {}",
            short_date(Some(&entry.timestamp)),
            entry.user_id,
            truncate(&entry.action, 60),
        )?;
    }
    Ok(())
}

/// Execute a backup subcommand.
pub async fn backup<G: Gateway>(
    orch: &mut Orchestrator<G>,
    action: BackupAction,
) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        BackupAction::Create => {
            let created = orch.export_backup().await?;
            writeln!(out, "{}", created.message)?;
            writeln!(out, "Server-side file: {}", created.file)?;
        }
        BackupAction::Restore { file } => {
            let payload = std::fs::read(&file)?;
            let name = file
                .file_name()
                .map_or_else(|| "backup.db".to_string(), |n| n.to_string_lossy().to_string());
            orch.restore_backup(&name, payload).await?;
            writeln!(out, "Backup restored; collections reloaded.")?;
        }
    }
    Ok(())
}

/// Initiate 2FA setup and print the provisioning URI.
pub async fn two_factor<G: Gateway>(orch: &mut Orchestrator<G>) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let setup = orch.setup_two_factor().await?;
    writeln!(out, "Secret: {}", setup.secret)?;
    writeln!(out, "Provisioning URI (scan as QR): {}", setup.qr_uri)?;
    Ok(())
}

/// Change the current account's password.
pub async fn passwd<G: Gateway>(orch: &mut Orchestrator<G>) -> anyhow::Result<()> {
    let password = dialoguer::Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()?;
    orch.change_password(&password).await?;
    writeln!(io::stdout(), "Password changed.")?;
    Ok(())
}

/// Public subscription lookup; requires no session.
pub async fn subscription<G: Gateway>(orch: &Orchestrator<G>, uuid: &str) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let sub = orch.subscription(uuid).await?;
    writeln!(out, "  Account:    {}", sub.username)?;
    writeln!(out, "  Server:     {}", sub.server)?;
    writeln!(out, "  Active:     {}", yes_no(sub.is_active))?;
    writeln!(out, "  Online:     {}", yes_no(sub.is_online))?;
    writeln!(out, "  Used:       {:.2} GB", sub.traffic_used)?;
    writeln!(out, "  Remaining:  {}", sub.traffic_remaining)?;
    writeln!(out, "  Expires:    {}", short_date(sub.expiry_date.as_deref()))?;
    writeln!(out, "  vless:      {}", sub.vless_link)?;
    writeln!(out, "  vmess:      {}", sub.vmess_link)?;
    Ok(())
}
