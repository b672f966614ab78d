//! Resource orchestrator.
//!
//! Owns the in-memory snapshot of each remote collection for the active
//! session, gates every mutating call through the authorization policy,
//! and re-fetches affected collections after each successful mutation so
//! the local view always reflects server-computed state (traffic totals,
//! online flags) rather than a stale local projection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use panelctl_core::policy::{can_perform, Action};
use panelctl_core::roles::{Caller, Role};

use crate::api::error::ApiError;
use crate::api::types::{
    Account, AuditLogEntry, BackupCreated, NewAccount, NewServer, Notification, RenewRequest,
    ReportSnapshot, Server, Subscription, TwoFactorSetup,
};
use crate::api::Gateway;
use crate::session::SessionStore;

/// Lifecycle of one resource collection's snapshot.
///
/// `Unloaded -> Loading -> Loaded | Failed`, with `Loaded -> Loading` on
/// every refresh. A refresh failure keeps the last good snapshot; `Failed`
/// is only recorded when there was nothing good to keep.
#[derive(Debug, Clone, Default)]
pub enum LoadState<T> {
    #[default]
    Unloaded,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    /// The snapshot, when loaded.
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub const fn is_unloaded(&self) -> bool {
        matches!(self, Self::Unloaded)
    }
}

/// Outcome of an orchestrator action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The local policy denied the action; the gateway was never called.
    #[error("denied: {0}")]
    Denied(String),

    /// The gateway call itself failed; snapshots are unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The mutation took effect remotely but the follow-up refresh failed,
    /// so the local snapshot may be stale. Distinct from a failed mutation.
    #[error("action applied remotely, but the refresh failed: {0}")]
    StaleView(ApiError),

    /// The session store could not be persisted.
    #[error("session storage error: {0}")]
    Storage(String),
}

/// Clear the session store, forcing re-authentication. Invoked on any 401.
fn drop_session(session: &SessionStore) {
    if let Err(e) = session.clear() {
        warn!(error = %e, "failed to clear session store after 401");
    }
}

/// Refresh failed: keep the last good snapshot if one exists, otherwise
/// record the failure.
fn keep_last_good<T>(prev: LoadState<T>, e: &ApiError) -> LoadState<T> {
    match prev {
        LoadState::Loaded(v) => LoadState::Loaded(v),
        _ => LoadState::Failed(e.to_string()),
    }
}

/// The session & role-gated resource-orchestration core.
pub struct Orchestrator<G: Gateway> {
    gateway: G,
    session: Arc<SessionStore>,
    profile: LoadState<Account>,
    accounts: LoadState<Vec<Account>>,
    servers: LoadState<Vec<Server>>,
    notifications: LoadState<Vec<Notification>>,
    reports: LoadState<ReportSnapshot>,
    logs: LoadState<Vec<AuditLogEntry>>,
}

impl<G: Gateway> Orchestrator<G> {
    pub fn new(gateway: G, session: Arc<SessionStore>) -> Self {
        Self {
            gateway,
            session,
            profile: LoadState::Unloaded,
            accounts: LoadState::Unloaded,
            servers: LoadState::Unloaded,
            notifications: LoadState::Unloaded,
            reports: LoadState::Unloaded,
            logs: LoadState::Unloaded,
        }
    }

    // -------------------------------------------------------------------
    // Snapshot accessors
    // -------------------------------------------------------------------

    pub const fn profile(&self) -> &LoadState<Account> {
        &self.profile
    }

    pub const fn accounts(&self) -> &LoadState<Vec<Account>> {
        &self.accounts
    }

    pub const fn servers(&self) -> &LoadState<Vec<Server>> {
        &self.servers
    }

    pub const fn notifications(&self) -> &LoadState<Vec<Notification>> {
        &self.notifications
    }

    pub const fn reports(&self) -> &LoadState<ReportSnapshot> {
        &self.reports
    }

    pub const fn logs(&self) -> &LoadState<Vec<AuditLogEntry>> {
        &self.logs
    }

    /// Resolve an account's server reference against the current servers
    /// snapshot. A dangling reference yields `None`; accounts are never
    /// cascaded or locally mutated when a server disappears.
    pub fn server_of(&self, account: &Account) -> Option<&Server> {
        let id = account.server_id?;
        self.servers.loaded()?.iter().find(|s| s.id == id)
    }

    /// Ask whether the current session may perform `action`. For rendering
    /// decisions only; every mutating path re-checks on its own.
    pub fn can(&self, action: &Action) -> bool {
        self.caller().is_ok_and(|c| can_perform(c, action))
    }

    // -------------------------------------------------------------------
    // Session lifecycle
    // -------------------------------------------------------------------

    /// Exchange credentials (plus an optional 2FA code, empty when unused)
    /// for a session, then load the role-appropriate collections.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        code: &str,
    ) -> Result<Role, ActionError> {
        let token = self.gateway.login(username, password, code).await?;
        self.session
            .set_token(&token.access_token)
            .map_err(|e| ActionError::Storage(e.to_string()))?;
        info!(%username, "session established");
        self.establish().await
    }

    /// Resolve the current account from a held token and trigger the
    /// initial collection loads. A `user`-role session never issues the
    /// Servers/Logs requests; the policy short-circuits them here.
    pub async fn establish(&mut self) -> Result<Role, ActionError> {
        if self.session.token().is_none() {
            return Err(ActionError::Api(ApiError::Unauthorized));
        }
        self.profile = LoadState::Loading;
        let me = match self.gateway.current_account().await {
            Ok(me) => me,
            Err(e) => {
                self.profile = LoadState::Failed(e.to_string());
                return Err(self.fail(e));
            }
        };
        let caller = Caller {
            id: me.id,
            role: me.role,
        };
        debug!(id = me.id, role = %me.role, "resolved session account");
        self.profile = LoadState::Loaded(me);

        self.accounts = LoadState::Loading;
        self.notifications = LoadState::Loading;
        self.reports = LoadState::Loading;
        // Disjoint collections, no ordering dependency between them.
        let (accounts, notifications, reports) = tokio::join!(
            self.gateway.list_accounts(),
            self.gateway.list_notifications(),
            self.gateway.reports(),
        );
        self.accounts = self.settle(accounts);
        self.notifications = self.settle(notifications);
        self.reports = self.settle(reports);

        if can_perform(caller, &Action::ViewServers) {
            self.servers = LoadState::Loading;
            self.logs = LoadState::Loading;
            let (servers, logs) = tokio::join!(self.gateway.list_servers(), self.gateway.list_logs());
            self.servers = self.settle(servers);
            self.logs = self.settle(logs);
        }

        Ok(caller.role)
    }

    /// Drop the session and reset every collection to `Unloaded`.
    pub fn logout(&mut self) -> Result<(), ActionError> {
        self.session
            .clear()
            .map_err(|e| ActionError::Storage(e.to_string()))?;
        self.profile = LoadState::Unloaded;
        self.accounts = LoadState::Unloaded;
        self.servers = LoadState::Unloaded;
        self.notifications = LoadState::Unloaded;
        self.reports = LoadState::Unloaded;
        self.logs = LoadState::Unloaded;
        Ok(())
    }

    fn settle<T>(&self, result: Result<T, ApiError>) -> LoadState<T> {
        match result {
            Ok(v) => LoadState::Loaded(v),
            Err(e) => {
                if matches!(e, ApiError::Unauthorized) {
                    drop_session(&self.session);
                }
                LoadState::Failed(e.to_string())
            }
        }
    }

    /// Map a gateway failure; a 401 additionally clears the session store
    /// so every subsequent gated call fails locally until re-login.
    fn fail(&self, e: ApiError) -> ActionError {
        if matches!(e, ApiError::Unauthorized) {
            drop_session(&self.session);
        }
        ActionError::Api(e)
    }

    /// Identity of the acting session. Requires both a token and a
    /// resolved profile; anything less is `Unauthorized` without any
    /// gateway traffic.
    fn caller(&self) -> Result<Caller, ActionError> {
        if self.session.token().is_none() {
            return Err(ActionError::Api(ApiError::Unauthorized));
        }
        match &self.profile {
            LoadState::Loaded(me) => Ok(Caller {
                id: me.id,
                role: me.role,
            }),
            _ => Err(ActionError::Api(ApiError::Unauthorized)),
        }
    }

    /// Policy gate: a denial never reaches the gateway.
    fn gate(&self, action: &Action) -> Result<Caller, ActionError> {
        let caller = self.caller()?;
        if can_perform(caller, action) {
            Ok(caller)
        } else {
            Err(ActionError::Denied(format!(
                "role {} may not perform this action",
                caller.role
            )))
        }
    }

    // -------------------------------------------------------------------
    // Collection refreshes
    // -------------------------------------------------------------------

    pub async fn reload_accounts(&mut self) -> Result<(), ApiError> {
        let prev = std::mem::replace(&mut self.accounts, LoadState::Loading);
        match self.gateway.list_accounts().await {
            Ok(list) => {
                self.accounts = LoadState::Loaded(list);
                Ok(())
            }
            Err(e) => {
                self.accounts = keep_last_good(prev, &e);
                if matches!(e, ApiError::Unauthorized) {
                    drop_session(&self.session);
                }
                Err(e)
            }
        }
    }

    pub async fn reload_servers(&mut self) -> Result<(), ApiError> {
        let prev = std::mem::replace(&mut self.servers, LoadState::Loading);
        match self.gateway.list_servers().await {
            Ok(list) => {
                self.servers = LoadState::Loaded(list);
                Ok(())
            }
            Err(e) => {
                self.servers = keep_last_good(prev, &e);
                if matches!(e, ApiError::Unauthorized) {
                    drop_session(&self.session);
                }
                Err(e)
            }
        }
    }

    pub async fn reload_notifications(&mut self) -> Result<(), ApiError> {
        let prev = std::mem::replace(&mut self.notifications, LoadState::Loading);
        match self.gateway.list_notifications().await {
            Ok(list) => {
                self.notifications = LoadState::Loaded(list);
                Ok(())
            }
            Err(e) => {
                self.notifications = keep_last_good(prev, &e);
                if matches!(e, ApiError::Unauthorized) {
                    drop_session(&self.session);
                }
                Err(e)
            }
        }
    }

    pub async fn reload_reports(&mut self) -> Result<(), ApiError> {
        let prev = std::mem::replace(&mut self.reports, LoadState::Loading);
        match self.gateway.reports().await {
            Ok(snapshot) => {
                self.reports = LoadState::Loaded(snapshot);
                Ok(())
            }
            Err(e) => {
                self.reports = keep_last_good(prev, &e);
                if matches!(e, ApiError::Unauthorized) {
                    drop_session(&self.session);
                }
                Err(e)
            }
        }
    }

    pub async fn reload_logs(&mut self) -> Result<(), ApiError> {
        let prev = std::mem::replace(&mut self.logs, LoadState::Loading);
        match self.gateway.list_logs().await {
            Ok(list) => {
                self.logs = LoadState::Loaded(list);
                Ok(())
            }
            Err(e) => {
                self.logs = keep_last_good(prev, &e);
                if matches!(e, ApiError::Unauthorized) {
                    drop_session(&self.session);
                }
                Err(e)
            }
        }
    }

    /// Account mutations also refresh the audit log for superadmins, whose
    /// actions the remote records there.
    async fn refresh_account_scope(&mut self, caller: Caller) -> Result<(), ActionError> {
        let mut result = self.reload_accounts().await;
        if caller.role == Role::Superadmin {
            let logs = self.reload_logs().await;
            result = result.and(logs);
        }
        result.map_err(ActionError::StaleView)
    }

    // -------------------------------------------------------------------
    // Gated mutations
    // -------------------------------------------------------------------

    pub async fn create_account(&mut self, req: &NewAccount) -> Result<(), ActionError> {
        let caller = self.gate(&Action::CreateAccount { new_role: req.role })?;
        self.gateway
            .create_account(req)
            .await
            .map_err(|e| self.fail(e))?;
        self.refresh_account_scope(caller).await
    }

    pub async fn delete_account(&mut self, username: &str) -> Result<(), ActionError> {
        let caller = self.gate(&Action::DeleteAccount)?;
        self.gateway
            .delete_account(username)
            .await
            .map_err(|e| self.fail(e))?;
        self.refresh_account_scope(caller).await
    }

    /// Renew resets the traffic/expiry baseline. The snapshot after this
    /// call comes from the refresh round-trip, never from the renew
    /// response itself.
    pub async fn renew_account(
        &mut self,
        username: &str,
        req: RenewRequest,
    ) -> Result<(), ActionError> {
        let caller = self.gate(&Action::RenewAccount)?;
        self.gateway
            .renew_account(username, req)
            .await
            .map_err(|e| self.fail(e))?;
        self.refresh_account_scope(caller).await
    }

    pub async fn toggle_account(&mut self, username: &str) -> Result<(), ActionError> {
        let caller = self.gate(&Action::ToggleActive)?;
        self.gateway
            .toggle_active(username)
            .await
            .map_err(|e| self.fail(e))?;
        self.refresh_account_scope(caller).await
    }

    pub async fn set_user_limit(
        &mut self,
        username: &str,
        new_limit: i64,
    ) -> Result<(), ActionError> {
        let caller = self.gate(&Action::SetUserLimit)?;
        self.gateway
            .set_user_limit(username, new_limit)
            .await
            .map_err(|e| self.fail(e))?;
        self.refresh_account_scope(caller).await
    }

    /// Bulk online probe: asks the remote to re-check liveness, then
    /// refreshes accounts so the derived flags land in the snapshot.
    pub async fn probe_online(&mut self) -> Result<(), ActionError> {
        let caller = self.gate(&Action::ProbeOnline)?;
        self.gateway.probe_online().await.map_err(|e| self.fail(e))?;
        self.refresh_account_scope(caller).await
    }

    pub async fn change_password(&mut self, new_password: &str) -> Result<(), ActionError> {
        let caller = self.gate(&Action::ChangePassword)?;
        self.gateway
            .change_password(new_password)
            .await
            .map_err(|e| self.fail(e))?;
        if caller.role == Role::Superadmin {
            self.reload_logs().await.map_err(ActionError::StaleView)?;
        }
        Ok(())
    }

    pub async fn create_server(&mut self, req: &NewServer) -> Result<(), ActionError> {
        self.gate(&Action::CreateServer)?;
        self.gateway
            .create_server(req)
            .await
            .map_err(|e| self.fail(e))?;
        let servers = self.reload_servers().await;
        let logs = self.reload_logs().await;
        servers.and(logs).map_err(ActionError::StaleView)
    }

    pub async fn update_server(&mut self, id: u64, req: &NewServer) -> Result<(), ActionError> {
        self.gate(&Action::UpdateServer)?;
        self.gateway
            .update_server(id, req)
            .await
            .map_err(|e| self.fail(e))?;
        let servers = self.reload_servers().await;
        let logs = self.reload_logs().await;
        servers.and(logs).map_err(ActionError::StaleView)
    }

    pub async fn create_notification(
        &mut self,
        user_id: u64,
        message: &str,
    ) -> Result<(), ActionError> {
        let caller = self.gate(&Action::CreateNotification)?;
        self.gateway
            .create_notification(user_id, message)
            .await
            .map_err(|e| self.fail(e))?;
        let mut result = self.reload_notifications().await;
        if caller.role == Role::Superadmin {
            let logs = self.reload_logs().await;
            result = result.and(logs);
        }
        result.map_err(ActionError::StaleView)
    }

    /// Marking an already-read notification read again is a no-op on the
    /// remote; it is never an error here.
    pub async fn mark_notification_read(&mut self, id: u64) -> Result<(), ActionError> {
        let caller = self.caller()?;
        let owner_id = self
            .notifications
            .loaded()
            .and_then(|ns| ns.iter().find(|n| n.id == id))
            .map_or(caller.id, |n| n.user_id);
        if !can_perform(caller, &Action::MarkNotificationRead { owner_id }) {
            return Err(ActionError::Denied(format!(
                "role {} may not mark another account's notification",
                caller.role
            )));
        }
        self.gateway
            .mark_notification_read(id)
            .await
            .map_err(|e| self.fail(e))?;
        self.reload_notifications()
            .await
            .map_err(ActionError::StaleView)
    }

    /// Export produces a server-side file reference for the caller to
    /// persist; no collection changes besides the audit trail.
    pub async fn export_backup(&mut self) -> Result<BackupCreated, ActionError> {
        self.gate(&Action::ExportBackup)?;
        let created = self
            .gateway
            .export_backup()
            .await
            .map_err(|e| self.fail(e))?;
        self.reload_logs().await.map_err(ActionError::StaleView)?;
        Ok(created)
    }

    /// A restore may replace the entire remote dataset, so every collection
    /// that was loaded (or had been attempted) is re-fetched.
    pub async fn restore_backup(
        &mut self,
        file_name: &str,
        payload: Vec<u8>,
    ) -> Result<(), ActionError> {
        self.gate(&Action::RestoreBackup)?;
        self.gateway
            .restore_backup(file_name, payload)
            .await
            .map_err(|e| self.fail(e))?;

        let mut result = Ok(());
        match self.gateway.current_account().await {
            Ok(me) => self.profile = LoadState::Loaded(me),
            Err(e) => result = result.and(Err(e)),
        }
        if !self.accounts.is_unloaded() {
            result = result.and(self.reload_accounts().await);
        }
        if !self.notifications.is_unloaded() {
            result = result.and(self.reload_notifications().await);
        }
        if !self.reports.is_unloaded() {
            result = result.and(self.reload_reports().await);
        }
        if !self.servers.is_unloaded() {
            result = result.and(self.reload_servers().await);
        }
        if !self.logs.is_unloaded() {
            result = result.and(self.reload_logs().await);
        }
        result.map_err(ActionError::StaleView)
    }

    /// Initiate 2FA setup for the caller; the provisioning URI is handed
    /// back for display or QR rendering.
    pub async fn setup_two_factor(&mut self) -> Result<TwoFactorSetup, ActionError> {
        self.gate(&Action::SetupTwoFactor)?;
        self.gateway
            .setup_two_factor()
            .await
            .map_err(|e| self.fail(e))
    }

    /// Public subscription lookup. No session, no policy gate: this is the
    /// end-subscriber surface, outside the orchestrator's authorization.
    pub async fn subscription(&self, uuid: &str) -> Result<Subscription, ActionError> {
        Ok(self.gateway.subscription(uuid).await?)
    }
}
