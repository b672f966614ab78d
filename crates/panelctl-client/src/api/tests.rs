//! Tests for the API gateway and wire types.

use std::sync::Arc;

use super::client::HttpGateway;
use super::error::ApiError;
use super::types::{
    Account, Notification, Protocol, ReportSnapshot, Server, Subscription, TrafficRemaining,
};
use crate::session::SessionStore;

// =============================================================================
// Client construction tests
// =============================================================================

#[test]
fn empty_base_url_is_rejected() {
    let session = Arc::new(SessionStore::ephemeral());
    assert!(HttpGateway::new("", session).is_err());
}

#[test]
fn valid_base_url_creates_gateway() {
    let session = Arc::new(SessionStore::ephemeral());
    assert!(HttpGateway::new("https://panel.example.com", session).is_ok());
}

#[test]
fn trailing_slash_stripped_from_base_url() {
    let session = Arc::new(SessionStore::ephemeral());
    let gateway = HttpGateway::new("https://panel.example.com/", session).unwrap();
    assert_eq!(
        gateway.url("/users/"),
        "https://panel.example.com/users/"
    );
}

// =============================================================================
// Status mapping tests
// =============================================================================

#[test]
fn status_401_maps_to_unauthorized() {
    assert!(matches!(
        ApiError::from_status(401, "expired".into()),
        ApiError::Unauthorized
    ));
}

#[test]
fn status_403_preserves_remote_detail() {
    match ApiError::from_status(403, "Not authorized".into()) {
        ApiError::Forbidden(detail) => assert_eq!(detail, "Not authorized"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn status_404_maps_to_not_found() {
    assert!(matches!(
        ApiError::from_status(404, "User not found".into()),
        ApiError::NotFound(_)
    ));
}

#[test]
fn status_400_and_409_map_to_conflict() {
    assert!(matches!(
        ApiError::from_status(400, "Username already exists".into()),
        ApiError::Conflict(_)
    ));
    assert!(matches!(
        ApiError::from_status(409, "dup".into()),
        ApiError::Conflict(_)
    ));
}

#[test]
fn status_5xx_maps_to_remote_unavailable() {
    assert!(matches!(
        ApiError::from_status(502, "bad gateway".into()),
        ApiError::RemoteUnavailable(_)
    ));
}

// =============================================================================
// Deserialization tests
// =============================================================================

#[test]
fn deserialize_account_full() {
    let json = r#"{
        "id": 3,
        "username": "bob",
        "uuid": "9f8e7d6c",
        "role": "user",
        "traffic_limit": 50.0,
        "traffic_used": 12.5,
        "admin_id": 2,
        "user_limit": 0,
        "expiry_date": "2026-09-30T00:00:00",
        "is_online": true,
        "is_active": true,
        "server_id": 1
    }"#;
    let account: Account = serde_json::from_str(json).unwrap();
    assert_eq!(account.username, "bob");
    assert_eq!(account.role, panelctl_core::Role::User);
    assert_eq!(account.server_id, Some(1));
    assert!(account.is_online);
}

#[test]
fn deserialize_account_minimal_optionals_default() {
    let json = r#"{
        "id": 1,
        "username": "root",
        "uuid": "aa",
        "role": "superadmin",
        "traffic_limit": 0,
        "traffic_used": 0,
        "is_active": true
    }"#;
    let account: Account = serde_json::from_str(json).unwrap();
    assert_eq!(account.admin_id, None);
    assert_eq!(account.expiry_date, None);
    assert_eq!(account.server_id, None);
    assert!(!account.is_online);
}

#[test]
fn deserialize_server() {
    let json = r#"{
        "id": 1,
        "name": "relay-eu-1",
        "ip_address": "203.0.113.9",
        "port": 12345,
        "protocol": "vmess",
        "api_port": 54321,
        "is_connected": true,
        "last_checked": "2026-08-29T10:00:00"
    }"#;
    let server: Server = serde_json::from_str(json).unwrap();
    assert_eq!(server.protocol, Protocol::Vmess);
    assert!(server.is_connected);
}

#[test]
fn deserialize_notification() {
    let json = r#"{
        "id": 11,
        "user_id": 3,
        "message": "Welcome!",
        "is_read": false,
        "timestamp": "2026-08-29T09:00:00"
    }"#;
    let n: Notification = serde_json::from_str(json).unwrap();
    assert!(!n.is_read);
    assert_eq!(n.user_id, 3);
}

#[test]
fn deserialize_report_snapshot_orders_daily_series() {
    let json = r#"{
        "total_traffic_used_gb": 120.5,
        "active_users": 14,
        "online_users": 6,
        "daily_traffic": {"2026-08-28": 3, "2026-08-26": 1, "2026-08-27": 2}
    }"#;
    let report: ReportSnapshot = serde_json::from_str(json).unwrap();
    let dates: Vec<_> = report.daily_traffic.keys().cloned().collect();
    assert_eq!(dates, vec!["2026-08-26", "2026-08-27", "2026-08-28"]);
}

#[test]
fn deserialize_subscription_numeric_remaining() {
    let json = r#"{
        "username": "bob",
        "traffic_limit": 50.0,
        "traffic_used": 12.5,
        "traffic_remaining": 37.5,
        "expiry_date": "2026-09-30T00:00:00",
        "vless_link": "vless://9f8e@203.0.113.9:12345",
        "vmess_link": "vmess://abcd",
        "is_online": false,
        "is_active": true,
        "server": "relay-eu-1"
    }"#;
    let sub: Subscription = serde_json::from_str(json).unwrap();
    assert!(matches!(sub.traffic_remaining, TrafficRemaining::Gb(v) if (v - 37.5).abs() < f64::EPSILON));
}

#[test]
fn deserialize_subscription_unlimited_remaining() {
    let json = r#"{
        "username": "bob",
        "traffic_limit": 0,
        "traffic_used": 12.5,
        "traffic_remaining": "Unlimited",
        "vless_link": "vless://9f8e@203.0.113.9:12345",
        "vmess_link": "vmess://abcd",
        "is_online": false,
        "is_active": true,
        "server": "relay-eu-1"
    }"#;
    let sub: Subscription = serde_json::from_str(json).unwrap();
    assert_eq!(sub.traffic_remaining.to_string(), "Unlimited");
}

#[test]
fn protocol_round_trips_through_str() {
    for proto in [Protocol::Vless, Protocol::Vmess] {
        assert_eq!(proto.to_string().parse::<Protocol>(), Ok(proto));
    }
    assert!("wireguard".parse::<Protocol>().is_err());
}
