//! Account management subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use clap::Subcommand;

use panelctl_client::api::types::{NewAccount, RenewRequest};
use panelctl_client::api::Gateway;
use panelctl_client::Orchestrator;
use panelctl_core::Role;

use crate::output::{short_date, traffic_limit, truncate, yes_no};

/// Account subcommand actions.
#[derive(Subcommand, Debug)]
pub enum AccountAction {
    /// List accounts visible to this session
    List,
    /// Create an account (password prompted interactively)
    Create {
        username: String,
        /// Traffic allowance in GB; 0 for unlimited
        #[arg(short, long, default_value_t = 0.0)]
        traffic_limit: f64,
        /// Role for the new account
        #[arg(short, long, default_value = "user")]
        role: Role,
        /// How many accounts an admin may create (admin roles only)
        #[arg(short, long, default_value_t = 0)]
        user_limit: i64,
        /// Relay server id to attach the account to
        #[arg(short, long)]
        server: Option<u64>,
    },
    /// Delete an account by username
    Delete { username: String },
    /// Renew an account: new traffic allowance and day extension
    Renew {
        username: String,
        #[arg(short, long)]
        traffic_limit: f64,
        #[arg(short, long)]
        days: u32,
    },
    /// Toggle an account's active flag
    Toggle { username: String },
    /// Update an admin's user-scoping limit (superadmin)
    SetLimit { username: String, new_limit: i64 },
    /// Ask the panel to re-probe online status, then show the result
    CheckOnline,
}

/// Execute an account subcommand.
pub async fn run<G: Gateway>(
    orch: &mut Orchestrator<G>,
    action: AccountAction,
) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        AccountAction::List => write_accounts(&mut out, orch)?,
        AccountAction::Create {
            username,
            traffic_limit,
            role,
            user_limit,
            server,
        } => {
            let password = dialoguer::Password::new()
                .with_prompt(format!("Password for new account {username}"))
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?;
            let req = NewAccount {
                username: username.clone(),
                password,
                traffic_limit,
                role,
                user_limit,
                server_id: server,
            };
            orch.create_account(&req).await?;
            writeln!(out, "Account {username} created.")?;
        }
        AccountAction::Delete { username } => {
            orch.delete_account(&username).await?;
            writeln!(out, "Account {username} deleted.")?;
        }
        AccountAction::Renew {
            username,
            traffic_limit,
            days,
        } => {
            orch.renew_account(
                &username,
                RenewRequest {
                    traffic_limit,
                    days,
                },
            )
            .await?;
            writeln!(out, "Account {username} renewed: {traffic_limit} GB, {days} days.")?;
        }
        AccountAction::Toggle { username } => {
            orch.toggle_account(&username).await?;
            writeln!(out, "Account {username} toggled.")?;
        }
        AccountAction::SetLimit {
            username,
            new_limit,
        } => {
            orch.set_user_limit(&username, new_limit).await?;
            writeln!(out, "User limit for {username} set to {new_limit}.")?;
        }
        AccountAction::CheckOnline => {
            orch.probe_online().await?;
            writeln!(out, "Online status re-probed.")?;
            write_accounts(&mut out, orch)?;
        }
    }
    Ok(())
}

fn write_accounts<G: Gateway>(
    out: &mut impl Write,
    orch: &Orchestrator<G>,
) -> anyhow::Result<()> {
    let Some(accounts) = orch.accounts().loaded() else {
        writeln!(out, "Accounts not loaded.")?;
        return Ok(());
    };
    if accounts.is_empty() {
        writeln!(out, "No accounts.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<20}  {:<10}  {:>12}  {:>10}  {:<6}  {:<6}  {:<10}  SERVER",
        "USERNAME", "ROLE", "LIMIT", "USED", "ACTIVE", "ONLINE", "EXPIRES"
    )?;
    for a in accounts {
        let server = orch
            .server_of(a)
            .map_or_else(|| "-".to_string(), |s| s.name.clone());
        writeln!(
            out,
            "{:<20}  {:<10}  {:>12}  {:>7.2} GB  {:<6}  {:<6}  {:<10}  {}",
            truncate(&a.username, 20),
            a.role.to_string(),
            traffic_limit(a.traffic_limit),
            a.traffic_used,
            yes_no(a.is_active),
            yes_no(a.is_online),
            short_date(a.expiry_date.as_deref()),
            server,
        )?;
    }
    writeln!(out, "\n{} account(s)", accounts.len())?;
    Ok(())
}
