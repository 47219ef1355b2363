//! Random credential generation.
//!
//! All values come from the thread-local CSPRNG. Uniqueness of generated
//! ids and tokens rests on collision improbability, not store constraints.

use rand::RngCore;
use uuid::Uuid;

/// Generates client credentials, token values, and document ids.
pub struct CredentialGenerator;

impl CredentialGenerator {
    /// Generate a 256-bit access or refresh token value, hex-encoded.
    #[must_use]
    pub fn token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Generate a client identifier: `client_` plus 128 random bits.
    #[must_use]
    pub fn client_id() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        format!("client_{}", hex::encode(bytes))
    }

    /// Generate a client secret: `secret_` plus 192 random bits.
    #[must_use]
    pub fn client_secret() -> String {
        let mut bytes = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut bytes);
        format!("secret_{}", hex::encode(bytes))
    }

    /// Generate a store document id.
    #[must_use]
    pub fn document_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_256_bits_hex() {
        let token = CredentialGenerator::token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_unique() {
        let a = CredentialGenerator::token();
        let b = CredentialGenerator::token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_client_credentials_shape() {
        let id = CredentialGenerator::client_id();
        let secret = CredentialGenerator::client_secret();
        assert!(id.starts_with("client_"));
        assert_eq!(id.len(), "client_".len() + 32);
        assert!(secret.starts_with("secret_"));
        assert_eq!(secret.len(), "secret_".len() + 48);
        assert_ne!(CredentialGenerator::client_id(), id);
    }
}
