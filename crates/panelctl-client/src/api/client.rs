//! HTTP gateway for the panel API.
//!
//! One operation per remote capability. Every gated call attaches the
//! current session token; a call made with no token fails locally with
//! `Unauthorized` instead of being sent. No retries happen here.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use tracing::debug;

use panelctl_core::error::Error;

use super::error::{ApiError, ErrorBody};
use super::types::{
    Account, AuditLogEntry, BackupCreated, NewAccount, NewServer, Notification, RenewRequest,
    ReportSnapshot, Server, Subscription, TokenResponse, TwoFactorSetup,
};
use crate::session::SessionStore;

/// Typed access to the remote panel API. One async method per remote
/// capability; implemented by [`HttpGateway`] and by mocks in tests.
#[allow(async_fn_in_trait)]
pub trait Gateway {
    // session
    async fn login(&self, username: &str, password: &str, code: &str)
    -> Result<TokenResponse, ApiError>;
    async fn current_account(&self) -> Result<Account, ApiError>;
    async fn change_password(&self, new_password: &str) -> Result<(), ApiError>;

    // accounts
    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError>;
    async fn create_account(&self, req: &NewAccount) -> Result<Account, ApiError>;
    async fn delete_account(&self, username: &str) -> Result<(), ApiError>;
    async fn renew_account(&self, username: &str, req: RenewRequest) -> Result<Account, ApiError>;
    async fn toggle_active(&self, username: &str) -> Result<(), ApiError>;
    async fn set_user_limit(&self, username: &str, new_limit: i64) -> Result<(), ApiError>;
    async fn probe_online(&self) -> Result<(), ApiError>;

    // servers
    async fn list_servers(&self) -> Result<Vec<Server>, ApiError>;
    async fn create_server(&self, req: &NewServer) -> Result<Server, ApiError>;
    async fn update_server(&self, id: u64, req: &NewServer) -> Result<Server, ApiError>;

    // notifications
    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError>;
    async fn create_notification(&self, user_id: u64, message: &str)
    -> Result<Notification, ApiError>;
    async fn mark_notification_read(&self, id: u64) -> Result<(), ApiError>;

    // reports and logs
    async fn reports(&self) -> Result<ReportSnapshot, ApiError>;
    async fn list_logs(&self) -> Result<Vec<AuditLogEntry>, ApiError>;

    // backup
    async fn export_backup(&self) -> Result<BackupCreated, ApiError>;
    async fn restore_backup(&self, file_name: &str, payload: Vec<u8>) -> Result<(), ApiError>;

    // second factor
    async fn setup_two_factor(&self) -> Result<TwoFactorSetup, ApiError>;

    // public, no session
    async fn subscription(&self, uuid: &str) -> Result<Subscription, ApiError>;
}

/// Gateway backed by the panel's REST API.
#[derive(Debug)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpGateway {
    /// Create a gateway for the given base URL, reading tokens from the
    /// shared session store.
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self, Error> {
        if base_url.is_empty() {
            return Err(Error::Config("api_url is empty".into()));
        }

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed -- safe to ignore.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Build the full URL for a given path.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current `Authorization` header value, or `Unauthorized` when the
    /// session store holds no token. Checked before any request is sent.
    fn bearer(&self) -> Result<String, ApiError> {
        self.session
            .token()
            .map(|t| format!("Bearer {t}"))
            .ok_or(ApiError::Unauthorized)
    }
}

/// Check HTTP response status, mapping non-success codes to the error
/// taxonomy and preserving the remote's detail string when present.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let detail = match resp.json::<ErrorBody>().await {
        Ok(body) => body.detail,
        Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
    };
    debug!(status = status.as_u16(), %detail, "remote rejected request");
    Err(ApiError::from_status(status.as_u16(), detail))
}

impl Gateway for HttpGateway {
    async fn login(
        &self,
        username: &str,
        password: &str,
        code: &str,
    ) -> Result<TokenResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password), ("code", code)])
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn current_account(&self) -> Result<Account, ApiError> {
        let resp = self
            .http
            .get(self.url("/users/me"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn change_password(&self, new_password: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .put(self.url("/users/me/password"))
            .header(AUTHORIZATION, self.bearer()?)
            .query(&[("new_password", new_password)])
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        let resp = self
            .http
            .get(self.url("/users/"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn create_account(&self, req: &NewAccount) -> Result<Account, ApiError> {
        let resp = self
            .http
            .post(self.url("/users/"))
            .header(AUTHORIZATION, self.bearer()?)
            .json(req)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn delete_account(&self, username: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/users/{username}")))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn renew_account(&self, username: &str, req: RenewRequest) -> Result<Account, ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/users/{username}/renew")))
            .header(AUTHORIZATION, self.bearer()?)
            .json(&req)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn toggle_active(&self, username: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/users/{username}/toggle-active")))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn set_user_limit(&self, username: &str, new_limit: i64) -> Result<(), ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/users/{username}/limit")))
            .header(AUTHORIZATION, self.bearer()?)
            .query(&[("new_limit", new_limit)])
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn probe_online(&self) -> Result<(), ApiError> {
        let resp = self
            .http
            .get(self.url("/users/check-online"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn list_servers(&self) -> Result<Vec<Server>, ApiError> {
        let resp = self
            .http
            .get(self.url("/servers/"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn create_server(&self, req: &NewServer) -> Result<Server, ApiError> {
        let resp = self
            .http
            .post(self.url("/servers/"))
            .header(AUTHORIZATION, self.bearer()?)
            .json(req)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn update_server(&self, id: u64, req: &NewServer) -> Result<Server, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/servers/{id}")))
            .header(AUTHORIZATION, self.bearer()?)
            .json(req)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let resp = self
            .http
            .get(self.url("/notifications/"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn create_notification(
        &self,
        user_id: u64,
        message: &str,
    ) -> Result<Notification, ApiError> {
        let resp = self
            .http
            .post(self.url("/notifications/"))
            .header(AUTHORIZATION, self.bearer()?)
            .query(&[("user_id", user_id)])
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn mark_notification_read(&self, id: u64) -> Result<(), ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/notifications/{id}/read")))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn reports(&self) -> Result<ReportSnapshot, ApiError> {
        let resp = self
            .http
            .get(self.url("/reports/"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn list_logs(&self) -> Result<Vec<AuditLogEntry>, ApiError> {
        let resp = self
            .http
            .get(self.url("/logs/"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn export_backup(&self) -> Result<BackupCreated, ApiError> {
        let resp = self
            .http
            .get(self.url("/backup/"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn restore_backup(&self, file_name: &str, payload: Vec<u8>) -> Result<(), ApiError> {
        let part = reqwest::multipart::Part::bytes(payload).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .http
            .post(self.url("/backup/restore/"))
            .header(AUTHORIZATION, self.bearer()?)
            .multipart(form)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn setup_two_factor(&self) -> Result<TwoFactorSetup, ApiError> {
        let resp = self
            .http
            .post(self.url("/2fa/setup/"))
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn subscription(&self, uuid: &str) -> Result<Subscription, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/subscription/{uuid}")))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }
}
