//! Relay server management subcommands (superadmin only).

use std::io::{self, Write};

use clap::Subcommand;

use panelctl_client::api::types::{NewServer, Protocol};
use panelctl_client::api::Gateway;
use panelctl_client::Orchestrator;

use crate::output::{short_date, truncate, yes_no};

/// Server subcommand actions.
#[derive(Subcommand, Debug)]
pub enum ServerAction {
    /// List relay servers
    List,
    /// Register a relay server
    Create {
        name: String,
        ip_address: String,
        #[arg(short, long, default_value_t = 12345)]
        port: u16,
        #[arg(long, default_value = "vless")]
        protocol: Protocol,
        #[arg(long, default_value_t = 54321)]
        api_port: u16,
    },
    /// Update a relay server
    Update {
        id: u64,
        name: String,
        ip_address: String,
        #[arg(short, long, default_value_t = 12345)]
        port: u16,
        #[arg(long, default_value = "vless")]
        protocol: Protocol,
        #[arg(long, default_value_t = 54321)]
        api_port: u16,
    },
}

/// Execute a server subcommand.
pub async fn run<G: Gateway>(
    orch: &mut Orchestrator<G>,
    action: ServerAction,
) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        ServerAction::List => {
            let Some(servers) = orch.servers().loaded() else {
                writeln!(out, "Servers not loaded.")?;
                return Ok(());
            };
            if servers.is_empty() {
                writeln!(out, "No servers registered.")?;
                return Ok(());
            }
            writeln!(
                out,
                "{:>4}  {:<20}  {:<16}  {:>6}  {:<8}  {:>8}  {:<9}  CHECKED",
                "ID", "NAME", "ADDRESS", "PORT", "PROTO", "API", "CONNECTED"
            )?;
            for s in servers {
                writeln!(
                    out,
                    "{:>4}  {:<20}  {:<16}  {:>6}  {:<8}  {:>8}  {:<9}  {}",
                    s.id,
                    truncate(&s.name, 20),
                    s.ip_address,
                    s.port,
                    s.protocol.to_string(),
                    s.api_port,
                    yes_no(s.is_connected),
                    short_date(s.last_checked.as_deref()),
                )?;
            }
        }
        ServerAction::Create {
            name,
            ip_address,
            port,
            protocol,
            api_port,
        } => {
            let req = NewServer {
                name: name.clone(),
                ip_address,
                port,
                protocol,
                api_port,
            };
            orch.create_server(&req).await?;
            writeln!(out, "Server {name} registered.")?;
        }
        ServerAction::Update {
            id,
            name,
            ip_address,
            port,
            protocol,
            api_port,
        } => {
            let req = NewServer {
                name,
                ip_address,
                port,
                protocol,
                api_port,
            };
            orch.update_server(id, &req).await?;
            writeln!(out, "Server {id} updated.")?;
        }
    }
    Ok(())
}
