//! OAuth2 bearer token service for the todo API.
//!
//! Provides client registration, password-grant token issuance, bearer
//! token validation, and idempotent revocation, backed by a pluggable
//! document store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod http;
pub mod identity;
pub mod metrics;
pub mod model;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use config::Config;
pub use error::AuthError;
pub use model::Principal;
pub use service::TokenService;
