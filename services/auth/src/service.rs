//! The token service: client registration, token issuance, validation,
//! and revocation behind one interface.
//!
//! The service is stateless per request; all state lives in the injected
//! document store. Every store round trip is bounded by the configured
//! timeout and surfaces `StoreUnavailable` instead of hanging.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::AuthError;
use crate::generator::CredentialGenerator;
use crate::identity::CredentialVerifier;
use crate::metrics;
use crate::model::{ClientPage, OauthClient, Principal, TokenRecord, TokenResponse};
use crate::store::{AuthStore, StoreError};

/// The only grant type the token endpoint implements.
pub const GRANT_PASSWORD: &str = "password";

/// A password-grant token request, already parameter-validated.
#[derive(Debug, Clone)]
pub struct TokenGrant<'a> {
    /// Requested grant type.
    pub grant_type: &'a str,
    /// Requesting client id.
    pub client_id: &'a str,
    /// Requesting client secret.
    pub client_secret: &'a str,
    /// Resource-owner username.
    pub username: &'a str,
    /// Resource-owner password.
    pub password: &'a str,
    /// Requested scope, or the configured default when absent.
    pub scope: Option<&'a str>,
}

/// Issues, validates, and revokes bearer tokens; manages client
/// registrations. Holds only references to its collaborators, so isolated
/// tests construct it around an in-memory store and a fixed clock.
pub struct TokenService {
    store: Arc<dyn AuthStore>,
    verifier: Arc<dyn CredentialVerifier>,
    clock: Arc<dyn Clock>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    default_scope: String,
    store_timeout: Duration,
    page_size: usize,
    page_size_max: usize,
}

impl TokenService {
    /// Construct a service from its collaborators and configuration.
    pub fn new(
        store: Arc<dyn AuthStore>,
        verifier: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            verifier,
            clock,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            default_scope: config.default_scope.clone(),
            store_timeout: config.store_timeout,
            page_size: config.client_page_size,
            page_size_max: config.client_page_size_max,
        }
    }

    /// Bound a store round trip by the configured timeout.
    async fn store_call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(Ok(value)) => {
                metrics::STORE_OPERATIONS
                    .with_label_values(&[operation, "ok"])
                    .inc();
                Ok(value)
            }
            Ok(Err(err)) => {
                metrics::STORE_OPERATIONS
                    .with_label_values(&[operation, "error"])
                    .inc();
                warn!(operation, error = %err, "store operation failed");
                Err(AuthError::Store(err))
            }
            Err(_) => {
                metrics::STORE_OPERATIONS
                    .with_label_values(&[operation, "timeout"])
                    .inc();
                warn!(operation, timeout = ?self.store_timeout, "store operation timed out");
                Err(AuthError::StoreUnavailable {
                    timeout: self.store_timeout,
                })
            }
        }
    }

    // --- Client registry ---

    /// Register a new OAuth client and return it, secret included.
    ///
    /// # Errors
    ///
    /// `Validation` when the name is empty or whitespace-only.
    pub async fn register_client(
        &self,
        name: &str,
        redirect_uris: Vec<String>,
        grants: Vec<String>,
    ) -> Result<OauthClient, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::validation("client name is required"));
        }

        let grants = if grants.is_empty() {
            vec![GRANT_PASSWORD.to_string()]
        } else {
            grants
        };

        let client = OauthClient {
            id: CredentialGenerator::document_id(),
            client_id: CredentialGenerator::client_id(),
            client_secret: CredentialGenerator::client_secret(),
            name: name.to_string(),
            redirect_uris,
            grants,
            active: true,
            created_at: self.clock.now(),
        };

        self.store_call("insert_client", self.store.insert_client(&client))
            .await?;

        info!(client_id = %client.client_id, name = %client.name, "registered oauth client");
        Ok(client)
    }

    /// List registered clients, ordered by registration time.
    ///
    /// The limit defaults to the configured page size and is clamped to the
    /// configured maximum, so the result set stays bounded however large
    /// the collection grows.
    pub async fn list_clients(
        &self,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<ClientPage, AuthError> {
        let limit = limit.unwrap_or(self.page_size).min(self.page_size_max).max(1);
        self.store_call("list_clients", self.store.list_clients(offset, limit))
            .await
    }

    /// Delete a client registration by document id.
    ///
    /// Tokens previously issued under the client stay valid until they
    /// expire or are revoked; there is no cascading revocation.
    ///
    /// # Errors
    ///
    /// `NotFound` when no client with that id exists.
    pub async fn delete_client(&self, id: &str) -> Result<(), AuthError> {
        let deleted = self
            .store_call("delete_client", self.store.delete_client(id))
            .await?;
        if !deleted {
            return Err(AuthError::not_found("client"));
        }
        info!(client_doc_id = %id, "deleted oauth client");
        Ok(())
    }

    // --- Token issuer ---

    /// Look up a client and, when a secret is supplied, check it in
    /// constant time. Unknown id and wrong secret both yield `None`; no
    /// distinguishing signal is leaked to callers.
    pub async fn authenticate_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Option<OauthClient>, AuthError> {
        let client = self
            .store_call(
                "find_client",
                self.store.find_client_by_client_id(client_id),
            )
            .await?;

        let Some(client) = client else {
            return Ok(None);
        };

        if let Some(secret) = client_secret {
            let matches: bool = client
                .client_secret
                .as_bytes()
                .ct_eq(secret.as_bytes())
                .into();
            if !matches {
                return Ok(None);
            }
        }
        Ok(Some(client))
    }

    /// Mint a token pair for a password-grant request.
    ///
    /// Two concurrent requests for the same user produce two independent,
    /// both-valid tokens; multiple sessions are allowed by design.
    ///
    /// # Errors
    ///
    /// `UnsupportedGrant` for any grant type other than `password`,
    /// `InvalidClient` for unknown client id or wrong secret,
    /// `InvalidGrant` when credential verification fails.
    pub async fn issue_token(&self, grant: TokenGrant<'_>) -> Result<TokenResponse, AuthError> {
        if grant.grant_type != GRANT_PASSWORD {
            return Err(AuthError::UnsupportedGrant {
                grant_type: grant.grant_type.to_string(),
            });
        }

        let client = self
            .authenticate_client(grant.client_id, Some(grant.client_secret))
            .await?
            .ok_or(AuthError::InvalidClient)?;

        let user = self.verifier.verify(grant.username, grant.password).await?;

        let scope = grant
            .scope
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.default_scope)
            .to_string();

        let now = self.clock.now();
        let record = TokenRecord {
            id: CredentialGenerator::document_id(),
            access_token: CredentialGenerator::token(),
            access_token_expires_at: now + chrono::Duration::seconds(self.access_ttl.as_secs() as i64),
            refresh_token: CredentialGenerator::token(),
            refresh_token_expires_at: now
                + chrono::Duration::seconds(self.refresh_ttl.as_secs() as i64),
            client_id: client.client_id.clone(),
            user_id: user.id.clone(),
            scope: scope.clone(),
            created_at: now,
        };

        self.store_call("insert_token", self.store.insert_token(&record))
            .await?;

        metrics::TOKENS_ISSUED
            .with_label_values(&[GRANT_PASSWORD])
            .inc();
        info!(client_id = %client.client_id, user_id = %user.id, "issued access token");

        Ok(TokenResponse {
            access_token: record.access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl.as_secs(),
            refresh_token: record.refresh_token,
            scope,
        })
    }

    // --- Token validator ---

    /// Determine whether a bearer token currently authorizes a request.
    ///
    /// Returns `None` for unknown tokens and for expired ones alike; a
    /// token whose expiry equals the current instant is already expired
    /// (validity requires expiry strictly after now).
    pub async fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<Option<Principal>, AuthError> {
        let record = self
            .store_call(
                "find_token",
                self.store.find_token_by_access_token(token),
            )
            .await?;

        let Some(record) = record else {
            metrics::TOKEN_VALIDATIONS
                .with_label_values(&["rejected"])
                .inc();
            return Ok(None);
        };

        if record.access_token_expires_at <= self.clock.now() {
            metrics::TOKEN_VALIDATIONS
                .with_label_values(&["rejected"])
                .inc();
            debug!(client_id = %record.client_id, "rejected expired access token");
            return Ok(None);
        }

        metrics::TOKEN_VALIDATIONS
            .with_label_values(&["granted"])
            .inc();
        Ok(Some(record.principal()))
    }

    // --- Token revoker ---

    /// Revoke an access token. Idempotent: revoking an unknown or
    /// already-revoked token succeeds the same way, so callers never have
    /// to distinguish "already revoked" from "revoked now". Deletion is
    /// destructive and final.
    pub async fn revoke_token(&self, token: &str) -> Result<bool, AuthError> {
        let deleted = self
            .store_call(
                "delete_token",
                self.store.delete_token_by_access_token(token),
            )
            .await?;

        let outcome = if deleted { "revoked" } else { "absent" };
        metrics::TOKENS_REVOKED.with_label_values(&[outcome]).inc();
        if deleted {
            info!("revoked access token");
        } else {
            debug!("revoke requested for unknown token");
        }
        Ok(true)
    }
}
