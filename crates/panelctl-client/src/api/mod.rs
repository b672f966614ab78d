//! Remote resource gateway.
//!
//! Typed accessors for every remote capability of the panel API, plus the
//! error taxonomy surfaced to the orchestrator.

pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{Gateway, HttpGateway};
pub use error::ApiError;
