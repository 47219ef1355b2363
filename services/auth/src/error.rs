//! Error handling for the token service.
//!
//! Provides a single non-exhaustive error enum with stable machine-readable
//! error codes, HTTP status mapping, and sanitized response bodies. Store
//! and internal failures never leak backend detail to clients.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Non-exhaustive error enum for forward compatibility.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed or missing input, detected before any store call.
    #[error("invalid request: {reason}")]
    Validation {
        /// Description of what was missing or malformed.
        reason: String,
    },

    /// A grant type other than `password` was requested.
    #[error("unsupported grant type: {grant_type}")]
    UnsupportedGrant {
        /// The grant type the client asked for.
        grant_type: String,
    },

    /// Unknown client id or wrong client secret. The two cases are
    /// deliberately indistinguishable.
    #[error("invalid client credentials")]
    InvalidClient,

    /// Resource-owner credential verification failed.
    #[error("invalid user credentials")]
    InvalidGrant,

    /// Unknown, expired, or revoked access token. The three cases are
    /// deliberately indistinguishable.
    #[error("invalid or expired access token")]
    InvalidToken,

    /// Unknown resource id.
    #[error("{resource} not found")]
    NotFound {
        /// The kind of resource that was looked up.
        resource: String,
    },

    /// The document store did not answer within the configured timeout.
    #[error("document store unavailable after {timeout:?}")]
    StoreUnavailable {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The document store reported a failure.
    #[error("document store error")]
    Store(#[source] StoreError),

    /// Internal error (details sanitized in responses).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Create a validation error with the given reason.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a not-found error for the given resource kind.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Get the stable error code for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::InvalidRequest,
            Self::UnsupportedGrant { .. } => ErrorKind::UnsupportedGrantType,
            Self::InvalidClient => ErrorKind::InvalidClient,
            Self::InvalidGrant => ErrorKind::InvalidGrant,
            Self::InvalidToken => ErrorKind::InvalidToken,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            Self::Store(_) => ErrorKind::StoreError,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Client-facing message. Store and internal errors collapse to a
    /// generic message so backend detail never reaches the response body.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Internal(_) => "internal server error".to_string(),
            Self::StoreUnavailable { .. } => "service temporarily unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Stable machine-readable error codes returned in the `error_kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing request parameter.
    InvalidRequest,
    /// Grant type is not supported.
    UnsupportedGrantType,
    /// Client authentication failed.
    InvalidClient,
    /// Resource-owner authentication failed.
    InvalidGrant,
    /// Access token is unknown or expired.
    InvalidToken,
    /// Resource does not exist.
    NotFound,
    /// Document store timed out.
    StoreUnavailable,
    /// Document store failed.
    StoreError,
    /// Unclassified internal failure.
    Internal,
}

impl ErrorKind {
    /// Get the string representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::UnsupportedGrantType => "UNSUPPORTED_GRANT_TYPE",
            Self::InvalidClient => "INVALID_CLIENT",
            Self::InvalidGrant => "INVALID_GRANT",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::NotFound => "NOT_FOUND",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreError => "STORE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest | Self::UnsupportedGrantType => StatusCode::BAD_REQUEST,
            Self::InvalidClient | Self::InvalidGrant | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::StoreError | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body: `{error, error_kind}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message (sanitized).
    pub error: String,
    /// Stable code for programmatic handling.
    pub error_kind: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if matches!(kind, ErrorKind::StoreError | ErrorKind::Internal) {
            tracing::error!(error = %self, error_kind = kind.as_str(), "request failed");
        }
        let body = ErrorBody {
            error: self.public_message(),
            error_kind: kind.as_str(),
        };
        (kind.status(), Json(body)).into_response()
    }
}
