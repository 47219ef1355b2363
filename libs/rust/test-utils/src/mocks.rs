//! Test doubles for the clock and the document store.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use auth_service::clock::Clock;
use auth_service::model::{ClientPage, OauthClient, TokenRecord};
use auth_service::store::{AuthStore, StoreError};

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock pinned at the given instant.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Create a clock pinned at an arbitrary fixed epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }

    /// Pin the clock to an exact instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap() = instant;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// A store whose every operation fails with a backend error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

#[async_trait]
impl AuthStore for FailingStore {
    async fn insert_client(&self, _client: &OauthClient) -> Result<(), StoreError> {
        Err(StoreError::backend("injected failure"))
    }

    async fn find_client_by_client_id(
        &self,
        _client_id: &str,
    ) -> Result<Option<OauthClient>, StoreError> {
        Err(StoreError::backend("injected failure"))
    }

    async fn list_clients(&self, _offset: usize, _limit: usize) -> Result<ClientPage, StoreError> {
        Err(StoreError::backend("injected failure"))
    }

    async fn delete_client(&self, _id: &str) -> Result<bool, StoreError> {
        Err(StoreError::backend("injected failure"))
    }

    async fn insert_token(&self, _token: &TokenRecord) -> Result<(), StoreError> {
        Err(StoreError::backend("injected failure"))
    }

    async fn find_token_by_access_token(
        &self,
        _access_token: &str,
    ) -> Result<Option<TokenRecord>, StoreError> {
        Err(StoreError::backend("injected failure"))
    }

    async fn delete_token_by_access_token(&self, _access_token: &str) -> Result<bool, StoreError> {
        Err(StoreError::backend("injected failure"))
    }
}

/// A store whose every operation never resolves, for exercising the
/// bounded-timeout path.
#[derive(Debug, Clone, Copy, Default)]
pub struct HangingStore;

#[async_trait]
impl AuthStore for HangingStore {
    async fn insert_client(&self, _client: &OauthClient) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn find_client_by_client_id(
        &self,
        _client_id: &str,
    ) -> Result<Option<OauthClient>, StoreError> {
        std::future::pending().await
    }

    async fn list_clients(&self, _offset: usize, _limit: usize) -> Result<ClientPage, StoreError> {
        std::future::pending().await
    }

    async fn delete_client(&self, _id: &str) -> Result<bool, StoreError> {
        std::future::pending().await
    }

    async fn insert_token(&self, _token: &TokenRecord) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn find_token_by_access_token(
        &self,
        _access_token: &str,
    ) -> Result<Option<TokenRecord>, StoreError> {
        std::future::pending().await
    }

    async fn delete_token_by_access_token(&self, _access_token: &str) -> Result<bool, StoreError> {
        std::future::pending().await
    }
}
