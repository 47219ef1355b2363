//! Document store abstraction for the `oauth_clients` and `oauth_tokens`
//! collections.
//!
//! The token service is the only writer to these collections. Uniqueness of
//! `client_id` and `access_token` values is enforced by CSPRNG collision
//! improbability, never by a store-level constraint.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ClientPage, OauthClient, TokenRecord};

pub use memory::MemoryStore;
pub use redis::RedisStore;

/// A failure reported by the store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored document could not be encoded or decoded.
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a backend error with the given message.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Persistence operations the token service needs.
///
/// Reads and writes are individually atomic but there is no transaction
/// boundary across calls; a revoke racing a validate on the same token may
/// land in either order.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Persist a new client registration.
    async fn insert_client(&self, client: &OauthClient) -> Result<(), StoreError>;

    /// Look up a client by its `client_id` value.
    async fn find_client_by_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<OauthClient>, StoreError>;

    /// List clients ordered by registration time.
    async fn list_clients(&self, offset: usize, limit: usize) -> Result<ClientPage, StoreError>;

    /// Delete a client by document id. Returns false when no such document
    /// exists. Tokens issued under the client are left untouched.
    async fn delete_client(&self, id: &str) -> Result<bool, StoreError>;

    /// Persist a newly issued token document.
    async fn insert_token(&self, token: &TokenRecord) -> Result<(), StoreError>;

    /// Look up a token document by exact access-token value.
    async fn find_token_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<TokenRecord>, StoreError>;

    /// Delete a token document by access-token value. Returns false when no
    /// such document exists.
    async fn delete_token_by_access_token(&self, access_token: &str) -> Result<bool, StoreError>;
}
