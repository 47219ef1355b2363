//! Centralized configuration for the token service.
//!
//! All configuration is loaded from environment variables and validated
//! at startup.

use std::env;
use std::time::Duration;

use crate::error::AuthError;

/// Document store backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store, for development and tests.
    Memory,
    /// Redis-backed store.
    Redis {
        /// Redis connection URL.
        url: String,
    },
}

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,

    // Token settings
    /// Access token lifetime.
    pub access_token_ttl: Duration,
    /// Refresh token lifetime.
    pub refresh_token_ttl: Duration,
    /// Scope granted when the token request names none.
    pub default_scope: String,

    // Store settings
    /// Which document store backend to use.
    pub store_backend: StoreBackend,
    /// Upper bound on any single store round trip.
    pub store_timeout: Duration,

    // Pagination
    /// Page size applied when a list request names none.
    pub client_page_size: usize,
    /// Largest page size a list request may ask for.
    pub client_page_size_max: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, AuthError> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_env("PORT", 8080)?;

        let access_token_ttl = Duration::from_secs(parse_env("ACCESS_TOKEN_TTL", 3600)?);
        let refresh_token_ttl = Duration::from_secs(parse_env("REFRESH_TOKEN_TTL", 1_209_600)?);
        let default_scope = env::var("DEFAULT_SCOPE").unwrap_or_else(|_| "read write".to_string());

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "redis" => StoreBackend::Redis {
                url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            },
            _ => StoreBackend::Memory,
        };
        let store_timeout = Duration::from_secs(parse_env("STORE_TIMEOUT", 5)?);

        let client_page_size = parse_env("CLIENT_PAGE_SIZE", 50)?;
        let client_page_size_max = parse_env("CLIENT_PAGE_SIZE_MAX", 200)?;

        Ok(Self {
            host,
            port,
            access_token_ttl,
            refresh_token_ttl,
            default_scope,
            store_backend,
            store_timeout,
            client_page_size,
            client_page_size_max,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(1_209_600),
            default_scope: "read write".to_string(),
            store_backend: StoreBackend::Memory,
            store_timeout: Duration::from_secs(5),
            client_page_size: 50,
            client_page_size_max: 200,
        }
    }
}

/// Parse environment variable with default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AuthError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| AuthError::validation(format!("invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.access_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(1_209_600));
        assert_eq!(config.default_scope, "read write");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.client_page_size, 50);
    }

    // Single test for everything env-var driven: the test runner is
    // parallel and process environment is shared.
    #[test]
    fn test_from_env() {
        env::remove_var("HOST");
        env::remove_var("PORT");
        env::remove_var("ACCESS_TOKEN_TTL");
        env::remove_var("STORE_BACKEND");

        let config = Config::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.access_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.store_backend, StoreBackend::Memory);

        env::set_var("PORT", "not-a-port");
        assert!(Config::from_env().is_err());
        env::remove_var("PORT");

        env::set_var("STORE_BACKEND", "redis");
        env::set_var("REDIS_URL", "redis://cache:6379");
        let config = Config::from_env().unwrap();
        assert_eq!(
            config.store_backend,
            StoreBackend::Redis {
                url: "redis://cache:6379".to_string()
            }
        );
        env::remove_var("STORE_BACKEND");
        env::remove_var("REDIS_URL");
    }
}
