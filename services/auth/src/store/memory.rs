//! In-memory store backend.
//!
//! Default backend for development and the double used by unit tests.
//! Documents live in per-collection maps keyed by document id, with
//! secondary indexes by `client_id` and access-token value.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AuthStore, StoreError};
use crate::model::{ClientPage, OauthClient, TokenRecord};

#[derive(Default)]
struct Collections {
    clients: HashMap<String, OauthClient>,
    clients_by_client_id: HashMap<String, String>,
    tokens: HashMap<String, TokenRecord>,
    tokens_by_access: HashMap<String, String>,
}

/// In-process document store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of token documents currently held. Expired tokens are never
    /// garbage-collected, so this only shrinks on revocation.
    pub async fn token_count(&self) -> usize {
        self.inner.read().await.tokens.len()
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn insert_client(&self, client: &OauthClient) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .clients_by_client_id
            .insert(client.client_id.clone(), client.id.clone());
        inner.clients.insert(client.id.clone(), client.clone());
        Ok(())
    }

    async fn find_client_by_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<OauthClient>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .clients_by_client_id
            .get(client_id)
            .and_then(|id| inner.clients.get(id))
            .cloned())
    }

    async fn list_clients(&self, offset: usize, limit: usize) -> Result<ClientPage, StoreError> {
        let inner = self.inner.read().await;
        let mut clients: Vec<OauthClient> = inner.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let total = clients.len();
        let clients = clients.into_iter().skip(offset).take(limit).collect();
        Ok(ClientPage {
            clients,
            total,
            offset,
            limit,
        })
    }

    async fn delete_client(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.clients.remove(id) {
            Some(client) => {
                inner.clients_by_client_id.remove(&client.client_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_token(&self, token: &TokenRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .tokens_by_access
            .insert(token.access_token.clone(), token.id.clone());
        inner.tokens.insert(token.id.clone(), token.clone());
        Ok(())
    }

    async fn find_token_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<TokenRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens_by_access
            .get(access_token)
            .and_then(|id| inner.tokens.get(id))
            .cloned())
    }

    async fn delete_token_by_access_token(&self, access_token: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.tokens_by_access.remove(access_token) {
            Some(id) => {
                inner.tokens.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_client(n: u32) -> OauthClient {
        OauthClient {
            id: format!("doc-{n}"),
            client_id: format!("client_{n}"),
            client_secret: format!("secret_{n}"),
            name: format!("App {n}"),
            redirect_uris: vec![],
            grants: vec!["password".to_string()],
            active: true,
            created_at: Utc::now() + chrono::Duration::seconds(i64::from(n)),
        }
    }

    fn sample_token(value: &str) -> TokenRecord {
        let now = Utc::now();
        TokenRecord {
            id: format!("tok-{value}"),
            access_token: value.to_string(),
            access_token_expires_at: now + chrono::Duration::hours(1),
            refresh_token: format!("refresh-{value}"),
            refresh_token_expires_at: now + chrono::Duration::days(14),
            client_id: "client_1".to_string(),
            user_id: "alice@example.com".to_string(),
            scope: "read write".to_string(),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_client_round_trip() {
        let store = MemoryStore::new();
        let client = sample_client(1);
        store.insert_client(&client).await.unwrap();

        let found = store.find_client_by_client_id("client_1").await.unwrap();
        assert_eq!(found, Some(client));
        assert!(store
            .find_client_by_client_id("client_unknown")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_client() {
        let store = MemoryStore::new();
        let client = sample_client(1);
        store.insert_client(&client).await.unwrap();

        assert!(store.delete_client("doc-1").await.unwrap());
        assert!(!store.delete_client("doc-1").await.unwrap());
        assert!(store
            .find_client_by_client_id("client_1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_clients_pagination() {
        let store = MemoryStore::new();
        for n in 0..5 {
            store.insert_client(&sample_client(n)).await.unwrap();
        }

        let page = store.list_clients(1, 2).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.clients.len(), 2);
        assert_eq!(page.clients[0].client_id, "client_1");
        assert_eq!(page.clients[1].client_id, "client_2");

        let tail = store.list_clients(4, 10).await.unwrap();
        assert_eq!(tail.clients.len(), 1);
        assert_eq!(tail.clients[0].client_id, "client_4");
    }

    #[tokio::test]
    async fn test_token_round_trip_and_delete() {
        let store = MemoryStore::new();
        let token = sample_token("abc");
        store.insert_token(&token).await.unwrap();

        let found = store.find_token_by_access_token("abc").await.unwrap();
        assert_eq!(found, Some(token));

        assert!(store.delete_token_by_access_token("abc").await.unwrap());
        assert!(!store.delete_token_by_access_token("abc").await.unwrap());
        assert!(store
            .find_token_by_access_token("abc")
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.token_count().await, 0);
    }
}
