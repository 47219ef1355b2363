//! Fixtures with sample client and token records.

use chrono::{DateTime, Duration, Utc};

use auth_service::model::{OauthClient, TokenRecord};

/// A registered client for tests.
#[must_use]
pub fn sample_client(n: u32) -> OauthClient {
    OauthClient {
        id: format!("doc-client-{n}"),
        client_id: format!("client_fixture{n}"),
        client_secret: format!("secret_fixture{n}"),
        name: format!("Test App {n}"),
        redirect_uris: vec!["https://todo.example.com/callback".to_string()],
        grants: vec!["password".to_string()],
        active: true,
        created_at: Utc::now(),
    }
}

/// A token record issued at `issued_at` with a one hour access lifetime
/// and fourteen day refresh lifetime.
#[must_use]
pub fn sample_token(value: &str, issued_at: DateTime<Utc>) -> TokenRecord {
    TokenRecord {
        id: format!("doc-token-{value}"),
        access_token: value.to_string(),
        access_token_expires_at: issued_at + Duration::hours(1),
        refresh_token: format!("{value}-refresh"),
        refresh_token_expires_at: issued_at + Duration::days(14),
        client_id: "client_fixture1".to_string(),
        user_id: "alice@example.com".to_string(),
        scope: "read write".to_string(),
        created_at: issued_at,
    }
}
