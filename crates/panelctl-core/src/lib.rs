//! `panelctl` Core Library
//!
//! Shared functionality for `panelctl` components:
//! - Role hierarchy and the authorization policy
//! - Configuration resolution and hierarchy
//! - Common error types

pub mod config;
pub mod error;
pub mod policy;
pub mod roles;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use policy::{can_perform, Action};
pub use roles::{Caller, Role};
