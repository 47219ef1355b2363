//! Bearer-token request authentication.
//!
//! The single gate resource-owning endpoints go through: extract the
//! bearer token from `Authorization`, validate it, and attach the
//! resulting principal to the request. Missing header, malformed header,
//! unknown token, and expired token all reject with the same 401.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AuthError;
use crate::model::Principal;
use crate::service::TokenService;

/// Extractor carrying the principal of a validated bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<TokenService>> for Authenticated {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &Arc<TokenService>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::InvalidToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        match service.validate_access_token(token).await? {
            Some(principal) => Ok(Self(principal)),
            None => Err(AuthError::InvalidToken),
        }
    }
}
