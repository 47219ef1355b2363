//! HTTP surface of the token service.
//!
//! Form-encoded bodies on the token and revoke endpoints, JSON on client
//! registration, matching what the web front end sends. Required-parameter
//! checks run before any store call so validation failures return
//! immediately.

pub mod bearer;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::AuthError;
use crate::model::{ClientPage, OauthClient, TokenResponse};
use crate::service::{TokenGrant, TokenService};

pub use bearer::Authenticated;

/// Build the service router.
pub fn router(service: Arc<TokenService>) -> Router {
    Router::new()
        .route("/api/auth/token", post(token))
        .route("/api/auth/clients", post(register_client).get(list_clients))
        .route("/api/auth/clients/:id", delete(delete_client))
        .route("/api/auth/revoke", post(revoke))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Token endpoint form body. Fields are optional so missing parameters map
/// to a 400 with a stable error code instead of a framework rejection.
#[derive(Debug, Deserialize)]
struct TokenForm {
    grant_type: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    username: Option<String>,
    password: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterClientBody {
    name: Option<String>,
    #[serde(default, rename = "redirectUris")]
    redirect_uris: Vec<String>,
    #[serde(default)]
    grants: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    offset: Option<usize>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RevokeForm {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct Message {
    message: String,
}

/// POST /api/auth/token: password-grant token issuance.
async fn token(
    State(service): State<Arc<TokenService>>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, AuthError> {
    let mut missing = Vec::new();
    if form.grant_type.is_none() {
        missing.push("grant_type");
    }
    if form.client_id.is_none() {
        missing.push("client_id");
    }
    if form.client_secret.is_none() {
        missing.push("client_secret");
    }
    if form.username.is_none() {
        missing.push("username");
    }
    if form.password.is_none() {
        missing.push("password");
    }
    if !missing.is_empty() {
        return Err(AuthError::validation(format!(
            "missing parameters: {}",
            missing.join(", ")
        )));
    }

    let response = service
        .issue_token(TokenGrant {
            grant_type: form.grant_type.as_deref().unwrap_or_default(),
            client_id: form.client_id.as_deref().unwrap_or_default(),
            client_secret: form.client_secret.as_deref().unwrap_or_default(),
            username: form.username.as_deref().unwrap_or_default(),
            password: form.password.as_deref().unwrap_or_default(),
            scope: form.scope.as_deref(),
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/auth/clients: register a new client.
async fn register_client(
    State(service): State<Arc<TokenService>>,
    Json(body): Json<RegisterClientBody>,
) -> Result<(StatusCode, Json<OauthClient>), AuthError> {
    let name = body
        .name
        .ok_or_else(|| AuthError::validation("missing parameter: name"))?;
    let client = service
        .register_client(&name, body.redirect_uris, body.grants)
        .await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/auth/clients: paged listing.
async fn list_clients(
    State(service): State<Arc<TokenService>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ClientPage>, AuthError> {
    let page = service
        .list_clients(query.offset.unwrap_or(0), query.limit)
        .await?;
    Ok(Json(page))
}

/// DELETE /api/auth/clients/:id: delete a registration.
async fn delete_client(
    State(service): State<Arc<TokenService>>,
    Path(id): Path<String>,
) -> Result<Json<Message>, AuthError> {
    service.delete_client(&id).await?;
    Ok(Json(Message {
        message: "client deleted".to_string(),
    }))
}

/// POST /api/auth/revoke: idempotent token revocation.
async fn revoke(
    State(service): State<Arc<TokenService>>,
    Form(form): Form<RevokeForm>,
) -> Result<Json<Message>, AuthError> {
    let token = form
        .token
        .ok_or_else(|| AuthError::validation("missing parameter: token"))?;
    service.revoke_token(&token).await?;
    Ok(Json(Message {
        message: "token revoked".to_string(),
    }))
}

/// GET /metrics: Prometheus exposition.
async fn metrics() -> Result<String, AuthError> {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buf = Vec::new();
    encoder
        .encode(&families, &mut buf)
        .map_err(|e| AuthError::Internal(anyhow::anyhow!("metrics encoding: {e}")))?;
    String::from_utf8(buf).map_err(|e| AuthError::Internal(anyhow::anyhow!("metrics utf8: {e}")))
}
