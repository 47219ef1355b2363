//! Prometheus metrics for the token service.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_service_tokens_issued_total",
        "Total number of access tokens issued",
        &["grant_type"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Token validation counter.
pub static TOKEN_VALIDATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_service_token_validations_total",
        "Total number of access token validations",
        &["result"]
    )
    .expect("Failed to register token_validations metric")
});

/// Tokens revoked counter.
pub static TOKENS_REVOKED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_service_tokens_revoked_total",
        "Total number of revocation requests",
        &["outcome"]
    )
    .expect("Failed to register tokens_revoked metric")
});

/// Store operation counter.
pub static STORE_OPERATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_service_store_operations_total",
        "Total number of document store operations",
        &["operation", "status"]
    )
    .expect("Failed to register store_operations metric")
});
