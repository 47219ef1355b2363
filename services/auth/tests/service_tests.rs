//! Service-level tests for issuance, validation, and revocation against
//! the in-memory store with a controlled clock.

use std::sync::Arc;
use std::time::Duration;

use auth_service::config::Config;
use auth_service::error::{AuthError, ErrorKind};
use auth_service::identity::AnyPasswordVerifier;
use auth_service::service::{TokenGrant, TokenService};
use auth_service::store::{AuthStore, MemoryStore};
use test_utils::mocks::{FailingStore, FixedClock, HangingStore};

fn service_with_store(
    store: Arc<dyn AuthStore>,
    clock: Arc<FixedClock>,
    config: &Config,
) -> TokenService {
    TokenService::new(store, Arc::new(AnyPasswordVerifier), clock, config)
}

fn setup() -> (TokenService, Arc<MemoryStore>, Arc<FixedClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new());
    let service = service_with_store(store.clone(), clock.clone(), &Config::default());
    (service, store, clock)
}

fn password_grant<'a>(client_id: &'a str, client_secret: &'a str) -> TokenGrant<'a> {
    TokenGrant {
        grant_type: "password",
        client_id,
        client_secret,
        username: "alice@example.com",
        password: "anything",
        scope: None,
    }
}

#[tokio::test]
async fn test_issue_then_validate_round_trip() {
    let (service, _, _) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();

    let response = service
        .issue_token(password_grant(&client.client_id, &client.client_secret))
        .await
        .unwrap();

    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.expires_in, 3600);
    assert_eq!(response.scope, "read write");
    assert_ne!(response.access_token, response.refresh_token);

    let principal = service
        .validate_access_token(&response.access_token)
        .await
        .unwrap()
        .expect("freshly issued token must validate");
    assert_eq!(principal.user_id, "alice@example.com");
    assert_eq!(principal.client_id, client.client_id);
    assert_eq!(principal.scope, "read write");
}

#[tokio::test]
async fn test_expiry_boundary_is_strict() {
    let (service, _, clock) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();
    let response = service
        .issue_token(password_grant(&client.client_id, &client.client_secret))
        .await
        .unwrap();

    // One second before expiry: still valid.
    clock.advance(Duration::from_secs(3599));
    assert!(service
        .validate_access_token(&response.access_token)
        .await
        .unwrap()
        .is_some());

    // At exactly the expiry instant: already expired.
    clock.advance(Duration::from_secs(1));
    assert!(service
        .validate_access_token(&response.access_token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_expired_and_unknown_tokens_are_indistinguishable() {
    let (service, _, clock) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();
    let response = service
        .issue_token(password_grant(&client.client_id, &client.client_secret))
        .await
        .unwrap();
    clock.advance(Duration::from_secs(7200));

    let expired = service
        .validate_access_token(&response.access_token)
        .await
        .unwrap();
    let unknown = service
        .validate_access_token("deadbeef".repeat(8).as_str())
        .await
        .unwrap();
    assert_eq!(expired, unknown);
    assert!(expired.is_none());
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let (service, store, _) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();
    let response = service
        .issue_token(password_grant(&client.client_id, &client.client_secret))
        .await
        .unwrap();

    assert!(service.revoke_token(&response.access_token).await.unwrap());
    assert!(service
        .validate_access_token(&response.access_token)
        .await
        .unwrap()
        .is_none());

    // Second revoke of the same token succeeds identically.
    assert!(service.revoke_token(&response.access_token).await.unwrap());
    assert_eq!(store.token_count().await, 0);

    // Revoking a never-issued token also succeeds.
    assert!(service.revoke_token("no-such-token").await.unwrap());
}

#[tokio::test]
async fn test_client_authentication_matrix() {
    let (service, _, _) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();

    let right = service
        .authenticate_client(&client.client_id, Some(&client.client_secret))
        .await
        .unwrap();
    assert_eq!(right.as_ref().map(|c| c.client_id.as_str()), Some(client.client_id.as_str()));

    let wrong = service
        .authenticate_client(&client.client_id, Some("secret_wrong"))
        .await
        .unwrap();
    assert!(wrong.is_none());

    let unknown = service
        .authenticate_client("client_unknown", Some(&client.client_secret))
        .await
        .unwrap();
    assert!(unknown.is_none());

    // No secret supplied: lookup alone succeeds.
    let lookup = service
        .authenticate_client(&client.client_id, None)
        .await
        .unwrap();
    assert!(lookup.is_some());
}

#[tokio::test]
async fn test_unsupported_grant_rejected() {
    let (service, _, _) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();

    let err = service
        .issue_token(TokenGrant {
            grant_type: "client_credentials",
            ..password_grant(&client.client_id, &client.client_secret)
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedGrantType);
}

#[tokio::test]
async fn test_wrong_secret_rejected_without_distinction() {
    let (service, _, _) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();

    let wrong_secret = service
        .issue_token(password_grant(&client.client_id, "secret_wrong"))
        .await
        .unwrap_err();
    let unknown_client = service
        .issue_token(password_grant("client_unknown", &client.client_secret))
        .await
        .unwrap_err();

    // Same error either way; no signal about which part was wrong.
    assert_eq!(wrong_secret.kind(), ErrorKind::InvalidClient);
    assert_eq!(unknown_client.kind(), ErrorKind::InvalidClient);
    assert_eq!(wrong_secret.public_message(), unknown_client.public_message());
}

#[tokio::test]
async fn test_empty_username_rejected() {
    let (service, _, _) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();

    let err = service
        .issue_token(TokenGrant {
            username: "  ",
            ..password_grant(&client.client_id, &client.client_secret)
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidGrant);
}

#[tokio::test]
async fn test_concurrent_issuance_yields_independent_tokens() {
    let (service, _, _) = setup();
    let service = Arc::new(service);
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();

    let a = {
        let service = service.clone();
        let (id, secret) = (client.client_id.clone(), client.client_secret.clone());
        tokio::spawn(async move {
            service.issue_token(password_grant(&id, &secret)).await
        })
    };
    let b = {
        let service = service.clone();
        let (id, secret) = (client.client_id.clone(), client.client_secret.clone());
        tokio::spawn(async move {
            service.issue_token(password_grant(&id, &secret)).await
        })
    };

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();
    assert_ne!(a.access_token, b.access_token);

    // Both sessions are valid at once.
    assert!(service.validate_access_token(&a.access_token).await.unwrap().is_some());
    assert!(service.validate_access_token(&b.access_token).await.unwrap().is_some());
}

#[tokio::test]
async fn test_concurrent_revoke_and_validate_never_errors() {
    // Revocation racing validation on the same token has no ordering
    // guarantee: validation may still succeed against a token that is being
    // deleted. The store contract only promises that neither call fails.
    let (service, _, _) = setup();
    let service = Arc::new(service);
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();
    let response = service
        .issue_token(password_grant(&client.client_id, &client.client_secret))
        .await
        .unwrap();

    let token = response.access_token.clone();
    let revoke = {
        let service = service.clone();
        let token = token.clone();
        tokio::spawn(async move { service.revoke_token(&token).await })
    };
    let validate = {
        let service = service.clone();
        let token = token.clone();
        tokio::spawn(async move { service.validate_access_token(&token).await })
    };

    assert!(revoke.await.unwrap().unwrap());
    // Either outcome is acceptable; the call itself must not fail.
    let _ = validate.await.unwrap().unwrap();

    // Once the revoke has settled, validation is deterministic.
    assert!(service.validate_access_token(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleting_client_leaves_issued_tokens_valid() {
    // Known gap, preserved deliberately: client deletion does not cascade
    // into token revocation, so orphaned tokens stay valid until expiry.
    let (service, _, _) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();
    let response = service
        .issue_token(password_grant(&client.client_id, &client.client_secret))
        .await
        .unwrap();

    service.delete_client(&client.id).await.unwrap();

    let principal = service
        .validate_access_token(&response.access_token)
        .await
        .unwrap();
    assert!(principal.is_some());

    // But no new tokens can be minted under the deleted client.
    let err = service
        .issue_token(password_grant(&client.client_id, &client.client_secret))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidClient);
}

#[tokio::test]
async fn test_delete_unknown_client_is_not_found() {
    let (service, _, _) = setup();
    let err = service.delete_client("no-such-doc").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_register_client_requires_name() {
    let (service, _, _) = setup();
    for name in ["", "   ", "\t\n"] {
        let err = service
            .register_client(name, vec![], vec![])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}

#[tokio::test]
async fn test_register_client_defaults() {
    let (service, _, _) = setup();
    let client = service
        .register_client("  Test App  ", vec![], vec![])
        .await
        .unwrap();
    assert_eq!(client.name, "Test App");
    assert_eq!(client.grants, vec!["password".to_string()]);
    assert!(client.active);
    assert!(client.client_id.starts_with("client_"));
    assert!(client.client_secret.starts_with("secret_"));
}

#[tokio::test]
async fn test_list_clients_is_bounded() {
    let mut config = Config::default();
    config.client_page_size = 3;
    config.client_page_size_max = 5;
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new());
    let service = service_with_store(store, clock.clone(), &config);

    for n in 0..10 {
        clock.advance(Duration::from_secs(1));
        service
            .register_client(&format!("App {n}"), vec![], vec![])
            .await
            .unwrap();
    }

    let default_page = service.list_clients(0, None).await.unwrap();
    assert_eq!(default_page.clients.len(), 3);
    assert_eq!(default_page.total, 10);

    // Requested limits are clamped to the configured maximum.
    let clamped = service.list_clients(0, Some(100)).await.unwrap();
    assert_eq!(clamped.clients.len(), 5);
    assert_eq!(clamped.limit, 5);

    let tail = service.list_clients(8, Some(5)).await.unwrap();
    assert_eq!(tail.clients.len(), 2);
    assert_eq!(tail.offset, 8);
}

#[tokio::test]
async fn test_requested_scope_is_echoed() {
    let (service, _, _) = setup();
    let client = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap();

    let response = service
        .issue_token(TokenGrant {
            scope: Some("todos:read"),
            ..password_grant(&client.client_id, &client.client_secret)
        })
        .await
        .unwrap();
    assert_eq!(response.scope, "todos:read");

    let principal = service
        .validate_access_token(&response.access_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(principal.scope, "todos:read");
}

#[tokio::test]
async fn test_store_failure_surfaces_as_store_error() {
    let clock = Arc::new(FixedClock::new());
    let service = service_with_store(Arc::new(FailingStore), clock, &Config::default());

    let err = service
        .register_client("Test App", vec![], vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreError);
    assert_eq!(err.public_message(), "internal server error");
}

#[tokio::test]
async fn test_hanging_store_times_out() {
    let mut config = Config::default();
    config.store_timeout = Duration::from_millis(50);
    let clock = Arc::new(FixedClock::new());
    let service = service_with_store(Arc::new(HangingStore), clock, &config);

    let err = service.validate_access_token("whatever").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    assert!(matches!(err, AuthError::StoreUnavailable { .. }));
    assert!(err.is_retryable());
}
