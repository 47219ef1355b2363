//! Redis-backed store.
//!
//! Documents are JSON values at `oauth:client:{id}` and `oauth:token:{id}`,
//! with value indexes at `oauth:client_id:{client_id}` and
//! `oauth:access:{token}`. A sorted set `oauth:clients` scored by
//! registration time gives ordered pagination. Token keys carry no TTL:
//! expired tokens stay until explicitly revoked, matching the service's
//! storage-growth behavior.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use super::{AuthStore, StoreError};
use crate::model::{ClientPage, OauthClient, TokenRecord};

const CLIENTS_INDEX: &str = "oauth:clients";

/// Redis document store.
pub struct RedisStore {
    conn: RwLock<ConnectionManager>,
}

impl RedisStore {
    /// Connect to Redis at the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created or the connection
    /// manager cannot be established.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(|e| StoreError::backend(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(Self {
            conn: RwLock::new(conn),
        })
    }

    fn client_key(id: &str) -> String {
        format!("oauth:client:{id}")
    }

    fn client_id_key(client_id: &str) -> String {
        format!("oauth:client_id:{client_id}")
    }

    fn token_key(id: &str) -> String {
        format!("oauth:token:{id}")
    }

    fn access_key(access_token: &str) -> String {
        format!("oauth:access:{access_token}")
    }

    /// Inclusive ZRANGE bounds for a page. The offset comes straight from
    /// the query string, so saturate rather than letting the cast wrap a
    /// huge value into a negative (from-the-end) start index.
    fn zrange_bounds(offset: usize, limit: usize) -> (i64, i64) {
        let start = i64::try_from(offset).unwrap_or(i64::MAX);
        let stop = start
            .saturating_add(i64::try_from(limit).unwrap_or(i64::MAX))
            .saturating_sub(1);
        (start, stop)
    }
}

#[async_trait]
impl AuthStore for RedisStore {
    async fn insert_client(&self, client: &OauthClient) -> Result<(), StoreError> {
        let value = serde_json::to_string(client)?;
        let mut conn = self.conn.write().await;

        conn.set::<_, _, ()>(Self::client_key(&client.id), &value)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        conn.set::<_, _, ()>(Self::client_id_key(&client.client_id), &client.id)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        conn.zadd::<_, _, _, ()>(
            CLIENTS_INDEX,
            &client.id,
            client.created_at.timestamp_millis(),
        )
        .await
        .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }

    async fn find_client_by_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<OauthClient>, StoreError> {
        let mut conn = self.conn.write().await;
        let doc_id: Option<String> = conn
            .get(Self::client_id_key(client_id))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;

        let Some(doc_id) = doc_id else {
            return Ok(None);
        };
        let value: Option<String> = conn
            .get(Self::client_key(&doc_id))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    async fn list_clients(&self, offset: usize, limit: usize) -> Result<ClientPage, StoreError> {
        let mut conn = self.conn.write().await;
        let total: usize = conn
            .zcard(CLIENTS_INDEX)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;

        if offset >= total || limit == 0 {
            return Ok(ClientPage {
                clients: Vec::new(),
                total,
                offset,
                limit,
            });
        }

        let (start, stop) = Self::zrange_bounds(offset, limit);
        let ids: Vec<String> = redis::cmd("ZRANGE")
            .arg(CLIENTS_INDEX)
            .arg(start)
            .arg(stop)
            .query_async(&mut *conn)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;

        let mut clients = Vec::with_capacity(ids.len());
        for id in ids {
            let value: Option<String> = conn
                .get(Self::client_key(&id))
                .await
                .map_err(|e| StoreError::backend(e.to_string()))?;
            if let Some(v) = value {
                clients.push(serde_json::from_str(&v)?);
            }
        }

        Ok(ClientPage {
            clients,
            total,
            offset,
            limit,
        })
    }

    async fn delete_client(&self, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.write().await;
        let value: Option<String> = conn
            .get(Self::client_key(id))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;

        let Some(value) = value else {
            return Ok(false);
        };
        let client: OauthClient = serde_json::from_str(&value)?;

        conn.del::<_, ()>(Self::client_key(id))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        conn.del::<_, ()>(Self::client_id_key(&client.client_id))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        conn.zrem::<_, _, ()>(CLIENTS_INDEX, id)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(true)
    }

    async fn insert_token(&self, token: &TokenRecord) -> Result<(), StoreError> {
        let value = serde_json::to_string(token)?;
        let mut conn = self.conn.write().await;

        conn.set::<_, _, ()>(Self::token_key(&token.id), &value)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        conn.set::<_, _, ()>(Self::access_key(&token.access_token), &token.id)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }

    async fn find_token_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<TokenRecord>, StoreError> {
        let mut conn = self.conn.write().await;
        let doc_id: Option<String> = conn
            .get(Self::access_key(access_token))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;

        let Some(doc_id) = doc_id else {
            return Ok(None);
        };
        let value: Option<String> = conn
            .get(Self::token_key(&doc_id))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    async fn delete_token_by_access_token(&self, access_token: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.write().await;
        let doc_id: Option<String> = conn
            .get(Self::access_key(access_token))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;

        let Some(doc_id) = doc_id else {
            return Ok(false);
        };
        conn.del::<_, ()>(Self::access_key(access_token))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        let removed: usize = conn
            .del(Self::token_key(&doc_id))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zrange_bounds_for_a_normal_page() {
        assert_eq!(RedisStore::zrange_bounds(0, 50), (0, 49));
        assert_eq!(RedisStore::zrange_bounds(100, 25), (100, 124));
    }

    #[test]
    fn test_zrange_bounds_saturate_on_huge_offset() {
        // An offset near or beyond i64::MAX must not wrap into a negative
        // start index, which Redis would treat as a from-the-end position.
        let (start, stop) = RedisStore::zrange_bounds(i64::MAX as usize, 200);
        assert_eq!(start, i64::MAX);
        assert_eq!(stop, i64::MAX);

        let (start, stop) = RedisStore::zrange_bounds(usize::MAX, 200);
        assert_eq!(start, i64::MAX);
        assert_eq!(stop, i64::MAX);
        assert!(start >= 0 && stop >= start);
    }
}
