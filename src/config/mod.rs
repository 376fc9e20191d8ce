pub(crate) use crate::config::cache::{CacheConfig, CacheStore};
use config::{Config as ConfigCrate, ConfigError};
use serde::Deserialize;

pub mod cache;
pub mod jwks;
pub mod provider;

pub use cache::InMemoryConfig;
pub use jwks::JwksConfig;
pub use provider::ProviderConfig;

/// Main configuration structure for the authentication core
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Provider validation settings (issuer, audience, algorithms)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// JWKS endpoint and fetch policy
    #[serde(default)]
    pub jwks: JwksConfig,

    /// Signing-key cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AuthConfig {
    /// Creates a new config instance from environment variables.
    ///
    /// Variables use the `AUTH_` prefix with `__` separating nesting levels,
    /// e.g. `AUTH_PROVIDER__ISSUER`, `AUTH_JWKS__URL`,
    /// `AUTH_JWKS__FETCH_TIMEOUT`, `AUTH_CACHE__STORE`.
    pub fn new() -> Result<Self, String> {
        ConfigCrate::builder()
            .add_source(
                config::Environment::with_prefix("AUTH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e: ConfigError| e.to_string())?
            .try_deserialize()
            .map_err(|e| e.to_string())
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(jwks_mock: &wiremock::MockServer) -> Self {
        Self {
            provider: ProviderConfig {
                name: "jwt".to_string(),
                issuer: "https://issuer.test".to_string(),
                audience: Some("https://api.test".to_string()),
                allowed_algorithms: vec!["RS256".to_string()],
                leeway: 0,
            },
            jwks: JwksConfig {
                url: format!("{}/.well-known/jwks.json", jwks_mock.uri()),
                fetch_timeout: 5,
                connect_timeout: 2,
                fetch_retries: 0,
                retry_backoff_ms: 10,
                // No refresh rate limiting in tests; individual tests opt in.
                min_refresh_interval: 0,
                refresh_on_miss: true,
            },
            cache: CacheConfig {
                ttl: 60,
                store: CacheStore::InMemory,
                memory: InMemoryConfig { capacity: 16 },
            },
        }
    }
}
