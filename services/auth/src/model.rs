//! Domain types for OAuth clients, tokens, and authenticated principals.
//!
//! Stored documents serialize with camelCase field names so the document
//! layout matches what the web front end and todo API already read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered application allowed to request tokens.
///
/// Created once at registration and never updated; deleted explicitly by
/// document id. Deleting a client does not revoke tokens issued under it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OauthClient {
    /// Store-generated document id.
    pub id: String,
    /// Opaque client identifier, unique across all clients.
    pub client_id: String,
    /// Shared secret presented at the token endpoint.
    pub client_secret: String,
    /// Display name.
    pub name: String,
    /// Registered redirect URIs. Unused by the password grant but kept as
    /// part of the registration record.
    pub redirect_uris: Vec<String>,
    /// Grant types this client may use.
    pub grants: Vec<String>,
    /// Whether the registration is active.
    pub active: bool,
    /// When the client was registered.
    pub created_at: DateTime<Utc>,
}

/// A persisted token document. Access and refresh fields are co-located in
/// one document; only the access token is ever validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Store-generated document id.
    pub id: String,
    /// Bearer credential, 256 random bits hex-encoded.
    pub access_token: String,
    /// Instant after which the access token no longer authorizes requests.
    pub access_token_expires_at: DateTime<Utc>,
    /// Refresh credential. Generated and stored, never validated.
    pub refresh_token: String,
    /// Nominal refresh expiry.
    pub refresh_token_expires_at: DateTime<Utc>,
    /// The client the token was issued to. A reference, not ownership:
    /// deleting the client leaves this record behind.
    pub client_id: String,
    /// The subject the token acts for.
    pub user_id: String,
    /// Space-separated permission string. Stored and echoed back, not
    /// otherwise enforced.
    pub scope: String,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

/// The result of validating an access token. Attached to a request for its
/// duration only; never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Principal {
    /// Subject identifier (here, the username/email).
    pub user_id: String,
    /// Client the presented token was issued to.
    pub client_id: String,
    /// Scope granted to the presented token.
    pub scope: String,
}

impl TokenRecord {
    /// Build the principal this token authenticates.
    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id.clone(),
            client_id: self.client_id.clone(),
            scope: self.scope.clone(),
        }
    }
}

/// Token endpoint success body (RFC 6749 §5.1 field names).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// The bearer credential.
    pub access_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Co-issued refresh credential.
    pub refresh_token: String,
    /// Scope granted to the token.
    pub scope: String,
}

/// One page of registered clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPage {
    /// Clients in this page, ordered by registration time.
    pub clients: Vec<OauthClient>,
    /// Total number of registered clients.
    pub total: usize,
    /// Offset this page starts at.
    pub offset: usize,
    /// Page size limit that was applied.
    pub limit: usize,
}
