//! Pluggable resource-owner credential verification.
//!
//! The token service never checks passwords itself; it depends on an
//! injected verifier so a real backend (hashed-password store, external
//! IdP) can be substituted without touching token logic.

use async_trait::async_trait;

use crate::error::AuthError;

/// A verified resource owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    /// Subject identifier.
    pub id: String,
    /// Email address.
    pub email: String,
}

/// Verifies a username/password pair.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify the pair, returning the verified user or `InvalidGrant`.
    async fn verify(&self, username: &str, password: &str) -> Result<VerifiedUser, AuthError>;
}

/// Verifier that accepts any password for any non-empty username.
///
/// This preserves the upstream behavior: identity is taken on trust from
/// the username and the password is never checked. Deployments with real
/// credentials swap in their own [`CredentialVerifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyPasswordVerifier;

#[async_trait]
impl CredentialVerifier for AnyPasswordVerifier {
    async fn verify(&self, username: &str, _password: &str) -> Result<VerifiedUser, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::InvalidGrant);
        }
        Ok(VerifiedUser {
            id: username.to_string(),
            email: username.to_string(),
        })
    }
}
