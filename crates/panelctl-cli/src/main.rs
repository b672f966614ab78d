//! panelctl CLI
//!
//! Operator console for the relay access panel. Every subcommand forwards
//! its intent to the orchestrator; no permission decision is made here
//! beyond asking the policy what to render.

use std::io::{self, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use panelctl_client::{HttpGateway, Orchestrator, SessionStore};
use panelctl_core::config::load_config;
use panelctl_core::tracing_init::init_tracing;

mod account_cmd;
mod notify_cmd;
mod ops_cmd;
mod output;
mod server_cmd;

#[derive(Parser, Debug)]
#[command(name = "panelctl")]
#[command(version, about = "Admin console for the relay access panel", long_about = None)]
struct Cli {
    /// Panel API base URL (overrides config and env)
    #[arg(long)]
    api_url: Option<String>,

    /// Emit structured JSON log lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session token
    Login {
        username: String,
        /// Second-factor code; leave empty when 2FA is not enabled
        #[arg(short, long, default_value = "")]
        code: String,
    },
    /// Drop the persisted session
    Logout,
    /// Show the current session account and its capabilities
    Whoami,
    /// Manage panel accounts
    #[command(subcommand)]
    Account(account_cmd::AccountAction),
    /// Manage relay servers (superadmin)
    #[command(subcommand)]
    Server(server_cmd::ServerAction),
    /// Notifications for the current session
    #[command(subcommand)]
    Notify(notify_cmd::NotifyAction),
    /// Traffic and usage report snapshot
    Reports,
    /// Audit log (superadmin)
    Logs,
    /// Backup export and restore (superadmin)
    #[command(subcommand)]
    Backup(ops_cmd::BackupAction),
    /// Set up a second factor for the current account
    #[command(name = "2fa")]
    TwoFactor,
    /// Change the current account's password
    Passwd,
    /// Public subscription lookup by account uuid (no session needed)
    Sub { uuid: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    init_tracing(&format!("panelctl={}", config.log_level), cli.log_json);
    info!(version = env!("CARGO_PKG_VERSION"), api_url = %config.api_url, "starting panelctl");

    let session = Arc::new(SessionStore::new(config.session_file()));
    let gateway = HttpGateway::new(&config.api_url, Arc::clone(&session))?;
    let mut orch = Orchestrator::new(gateway, session);

    match cli.command {
        Command::Login { username, code } => {
            let password = dialoguer::Password::new()
                .with_prompt(format!("Password for {username}"))
                .interact()?;
            let role = orch.login(&username, &password, &code).await?;
            writeln!(io::stdout(), "Logged in as {username} ({role}).")?;
        }
        Command::Logout => {
            orch.logout()?;
            writeln!(io::stdout(), "Session cleared.")?;
        }
        Command::Sub { uuid } => {
            // Public endpoint; no session establishment.
            ops_cmd::subscription(&orch, &uuid).await?;
        }
        command => {
            // Every other command is session-gated.
            orch.establish().await?;
            match command {
                Command::Whoami => ops_cmd::whoami(&orch)?,
                Command::Account(action) => account_cmd::run(&mut orch, action).await?,
                Command::Server(action) => server_cmd::run(&mut orch, action).await?,
                Command::Notify(action) => notify_cmd::run(&mut orch, action).await?,
                Command::Reports => ops_cmd::reports(&orch)?,
                Command::Logs => ops_cmd::logs(&orch)?,
                Command::Backup(action) => ops_cmd::backup(&mut orch, action).await?,
                Command::TwoFactor => ops_cmd::two_factor(&mut orch).await?,
                Command::Passwd => ops_cmd::passwd(&mut orch).await?,
                Command::Login { .. } | Command::Logout | Command::Sub { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
