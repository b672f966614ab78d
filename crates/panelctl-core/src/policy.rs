//! Authorization policy.
//!
//! A single pure decision function consulted before every gated action.
//! The presentation layer may ask it what to render; it never re-derives
//! permission on its own, and a denial never reaches the gateway.

use crate::roles::{Caller, Role};

/// A gated action, carrying the target owner id or target role where
/// self-scoping or role-assignment rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read an account profile.
    ViewProfile { owner_id: u64 },
    /// List accounts (the remote scopes results to the caller).
    ListAccounts,
    /// Create an account with the given role.
    CreateAccount { new_role: Role },
    /// Delete an account by username.
    DeleteAccount,
    /// Renew an account's traffic/expiry baseline.
    RenewAccount,
    /// Flip an account's active flag.
    ToggleActive,
    /// Update an admin's user-scoping limit.
    SetUserLimit,
    /// Ask the remote to re-probe liveness in bulk.
    ProbeOnline,
    /// Change the caller's own password.
    ChangePassword,
    /// List relay servers.
    ViewServers,
    /// Register a relay server.
    CreateServer,
    /// Update a relay server.
    UpdateServer,
    /// List the caller's notifications.
    ViewNotifications,
    /// Send a notification to an account.
    CreateNotification,
    /// Mark a notification as read.
    MarkNotificationRead { owner_id: u64 },
    /// Fetch the report snapshot.
    ViewReports,
    /// Read the audit log.
    ViewAuditLog,
    /// Trigger a backup export.
    ExportBackup,
    /// Submit a backup file for restore.
    RestoreBackup,
    /// Initiate 2FA setup for the caller.
    SetupTwoFactor,
}

/// Decide whether `caller` may perform `action`.
///
/// Total and deterministic: every (role, action) pair maps to a bool,
/// never panics, no side effects. Rules in priority order:
///
/// 1. `superadmin` may perform every action, including creating accounts
///    with elevated roles.
/// 2. `admin` may run the account lifecycle (regular users only) and
///    notifications, but never touches servers, the audit log, backups,
///    or user-scoping limits.
/// 3. `user` is limited to self-scoped reads, 2FA setup, and their own
///    password.
pub fn can_perform(caller: Caller, action: &Action) -> bool {
    match caller.role {
        Role::Superadmin => true,
        Role::Admin => match action {
            Action::CreateAccount { new_role } => *new_role == Role::User,
            Action::ViewProfile { .. }
            | Action::ListAccounts
            | Action::DeleteAccount
            | Action::RenewAccount
            | Action::ToggleActive
            | Action::ProbeOnline
            | Action::ChangePassword
            | Action::ViewNotifications
            | Action::CreateNotification
            | Action::MarkNotificationRead { .. }
            | Action::ViewReports
            | Action::SetupTwoFactor => true,
            Action::SetUserLimit
            | Action::ViewServers
            | Action::CreateServer
            | Action::UpdateServer
            | Action::ViewAuditLog
            | Action::ExportBackup
            | Action::RestoreBackup => false,
        },
        Role::User => match action {
            Action::ViewProfile { owner_id } | Action::MarkNotificationRead { owner_id } => {
                *owner_id == caller.id
            }
            Action::ListAccounts
            | Action::ViewNotifications
            | Action::ViewReports
            | Action::ChangePassword
            | Action::SetupTwoFactor => true,
            Action::CreateAccount { .. }
            | Action::DeleteAccount
            | Action::RenewAccount
            | Action::ToggleActive
            | Action::SetUserLimit
            | Action::ProbeOnline
            | Action::ViewServers
            | Action::CreateServer
            | Action::UpdateServer
            | Action::CreateNotification
            | Action::ViewAuditLog
            | Action::ExportBackup
            | Action::RestoreBackup => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn caller(id: u64, role: Role) -> Caller {
        Caller { id, role }
    }

    fn every_action() -> Vec<Action> {
        vec![
            Action::ViewProfile { owner_id: 1 },
            Action::ListAccounts,
            Action::CreateAccount {
                new_role: Role::User,
            },
            Action::CreateAccount {
                new_role: Role::Admin,
            },
            Action::CreateAccount {
                new_role: Role::Superadmin,
            },
            Action::DeleteAccount,
            Action::RenewAccount,
            Action::ToggleActive,
            Action::SetUserLimit,
            Action::ProbeOnline,
            Action::ChangePassword,
            Action::ViewServers,
            Action::CreateServer,
            Action::UpdateServer,
            Action::ViewNotifications,
            Action::CreateNotification,
            Action::MarkNotificationRead { owner_id: 1 },
            Action::ViewReports,
            Action::ViewAuditLog,
            Action::ExportBackup,
            Action::RestoreBackup,
            Action::SetupTwoFactor,
        ]
    }

    #[test]
    fn superadmin_allowed_everything() {
        let su = caller(1, Role::Superadmin);
        for action in every_action() {
            assert!(can_perform(su, &action), "denied: {action:?}");
        }
    }

    #[test]
    fn decision_is_deterministic() {
        let admin = caller(2, Role::Admin);
        for action in every_action() {
            assert_eq!(can_perform(admin, &action), can_perform(admin, &action));
        }
    }

    #[test]
    fn admin_creates_regular_users_only() {
        let admin = caller(2, Role::Admin);
        assert!(can_perform(
            admin,
            &Action::CreateAccount {
                new_role: Role::User
            }
        ));
        assert!(!can_perform(
            admin,
            &Action::CreateAccount {
                new_role: Role::Admin
            }
        ));
        assert!(!can_perform(
            admin,
            &Action::CreateAccount {
                new_role: Role::Superadmin
            }
        ));
    }

    #[test]
    fn admin_denied_server_and_audit_surface() {
        let admin = caller(2, Role::Admin);
        for action in [
            Action::ViewServers,
            Action::CreateServer,
            Action::UpdateServer,
            Action::ViewAuditLog,
            Action::ExportBackup,
            Action::RestoreBackup,
            Action::SetUserLimit,
        ] {
            assert!(!can_perform(admin, &action), "allowed: {action:?}");
        }
    }

    #[test]
    fn user_denied_every_privileged_action() {
        let user = caller(7, Role::User);
        for action in [
            Action::CreateAccount {
                new_role: Role::User,
            },
            Action::DeleteAccount,
            Action::RenewAccount,
            Action::ToggleActive,
            Action::SetUserLimit,
            Action::ProbeOnline,
            Action::ViewServers,
            Action::CreateServer,
            Action::UpdateServer,
            Action::CreateNotification,
            Action::ViewAuditLog,
            Action::ExportBackup,
            Action::RestoreBackup,
        ] {
            assert!(!can_perform(user, &action), "allowed: {action:?}");
        }
    }

    #[test]
    fn user_reads_are_self_scoped() {
        let user = caller(7, Role::User);
        assert!(can_perform(user, &Action::ViewProfile { owner_id: 7 }));
        assert!(!can_perform(user, &Action::ViewProfile { owner_id: 8 }));
        assert!(can_perform(user, &Action::MarkNotificationRead { owner_id: 7 }));
        assert!(!can_perform(user, &Action::MarkNotificationRead { owner_id: 8 }));
    }

    #[test]
    fn user_keeps_self_service_actions() {
        let user = caller(7, Role::User);
        for action in [
            Action::ListAccounts,
            Action::ViewNotifications,
            Action::ViewReports,
            Action::ChangePassword,
            Action::SetupTwoFactor,
        ] {
            assert!(can_perform(user, &action), "denied: {action:?}");
        }
    }

    #[test]
    fn admin_may_mark_any_notification_read() {
        let admin = caller(2, Role::Admin);
        assert!(can_perform(admin, &Action::MarkNotificationRead { owner_id: 99 }));
    }
}
