//! `panelctl` client core.
//!
//! The session & role-gated resource-orchestration core of the panel
//! console:
//! - `session` -- opaque bearer-token store, persisted across restarts
//! - `api` -- typed gateway to the remote panel API
//! - `orchestrator` -- per-collection snapshots, policy gating, and the
//!   refetch-after-mutation consistency protocol

pub mod api;
pub mod orchestrator;
pub mod session;

pub use api::{ApiError, Gateway, HttpGateway};
pub use orchestrator::{ActionError, LoadState, Orchestrator};
pub use session::SessionStore;
