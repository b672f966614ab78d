//! Panel API wire types.
//!
//! Deserialization structs matching the remote JSON responses, plus the
//! request payloads. Timestamps stay ISO-8601 strings as the remote emits
//! them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use panelctl_core::Role;

/// Panel account as returned by the accounts endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: u64,
    pub username: String,
    pub uuid: String,
    pub role: Role,
    /// Traffic allowance in GB; 0 means unlimited.
    pub traffic_limit: f64,
    /// Traffic consumed in GB; non-decreasing between renewals.
    pub traffic_used: f64,
    /// Creator scope for admin-owned accounts.
    #[serde(default)]
    pub admin_id: Option<u64>,
    /// Accounts this admin may create; meaningful for admin/superadmin.
    #[serde(default)]
    pub user_limit: i64,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    pub is_active: bool,
    /// Weak reference to a relay server; may dangle.
    #[serde(default)]
    pub server_id: Option<u64>,
}

/// Relay protocol spoken by a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Vless,
    Vmess,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vless => f.write_str("vless"),
            Self::Vmess => f.write_str("vmess"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vless" => Ok(Self::Vless),
            "vmess" => Ok(Self::Vmess),
            other => Err(format!("unknown protocol: {other}")),
        }
    }
}

/// Relay server record (superadmin-only resource).
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: u64,
    pub name: String,
    pub ip_address: String,
    pub port: u16,
    pub protocol: Protocol,
    pub api_port: u16,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub last_checked: Option<String>,
}

/// Notification targeting a single account.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub user_id: u64,
    pub message: String,
    pub is_read: bool,
    pub timestamp: String,
}

/// Server-side report snapshot; immutable once fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSnapshot {
    pub total_traffic_used_gb: f64,
    pub active_users: u64,
    pub online_users: u64,
    /// Date (YYYY-MM-DD) to traffic-event count, ordered by date.
    #[serde(default)]
    pub daily_traffic: BTreeMap<String, u64>,
}

/// Audit log entry (superadmin-only resource).
#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogEntry {
    pub user_id: u64,
    pub action: String,
    pub timestamp: String,
}

/// Remaining traffic: a number of GB, or the remote's "Unlimited" marker.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TrafficRemaining {
    Gb(f64),
    Text(String),
}

impl fmt::Display for TrafficRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gb(v) => write!(f, "{v} GB"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Public subscription view, keyed by an account's opaque uuid. Served
/// without a session; meant for the end subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub username: String,
    pub traffic_limit: f64,
    pub traffic_used: f64,
    pub traffic_remaining: TrafficRemaining,
    #[serde(default)]
    pub expiry_date: Option<String>,
    pub vless_link: String,
    pub vmess_link: String,
    pub is_online: bool,
    pub is_active: bool,
    pub server: String,
}

/// Bearer token issued on login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Result of initiating 2FA setup.
#[derive(Debug, Clone, Deserialize)]
pub struct TwoFactorSetup {
    pub secret: String,
    pub qr_uri: String,
}

/// Server-side backup file reference.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupCreated {
    pub message: String,
    pub file: String,
}

/// Payload for account creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub traffic_limit: f64,
    pub role: Role,
    pub user_limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<u64>,
}

/// Payload for account renewal; resets the traffic/expiry baseline.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RenewRequest {
    pub traffic_limit: f64,
    pub days: u32,
}

/// Payload for server creation and update.
#[derive(Debug, Clone, Serialize)]
pub struct NewServer {
    pub name: String,
    pub ip_address: String,
    pub port: u16,
    pub protocol: Protocol,
    pub api_port: u16,
}
