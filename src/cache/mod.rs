use crate::config::{CacheConfig, CacheStore};
use jsonwebtoken::DecodingKey;
use std::fmt;

pub mod memory;
pub mod null;

/// A provider signing key resolved from the JWKS document.
///
/// Immutable once fetched: a refresh inserts replacement values rather than
/// mutating existing ones, so concurrent readers never observe a torn key.
#[derive(Clone)]
pub struct SigningKey {
    key_id: String,
    algorithm: String,
    decoding_key: DecodingKey,
}

impl SigningKey {
    pub fn new(key_id: String, algorithm: String, decoding_key: DecodingKey) -> Self {
        Self {
            key_id,
            algorithm,
            decoding_key,
        }
    }

    /// The `kid` this key was published under.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Algorithm advertised by the JWK. Diagnostic only; the verifier
    /// enforces its own allow-list.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Store trait defining the interface for signing-key cache backends.
///
/// Implementations must be thread-safe (Send + Sync) and cloneable so the
/// store can be shared across concurrent verifications.
#[async_trait::async_trait]
pub trait KeyStoreBackend: Send + Sync {
    /// Retrieve a cached key by `kid`
    async fn get(&self, kid: &str) -> Option<SigningKey>;

    /// Store a key under its `kid`, replacing any previous value
    async fn insert(&self, key: SigningKey);

    /// Drop every cached key
    async fn clear(&self);
}

/// Key store wrapper providing a uniform interface regardless of backend.
///
/// The concrete implementation is chosen at runtime from the cache
/// configuration, mirroring how callers never depend on a specific backend.
#[derive(Clone)]
pub enum KeyStore {
    /// In-memory store backed by Moka, with TTL and capacity bounds
    InMemory(memory::InMemoryKeyStore),
    /// No-op store: nothing is retained, every lookup misses
    Null(null::NullKeyStore),
}

#[async_trait::async_trait]
impl KeyStoreBackend for KeyStore {
    async fn get(&self, kid: &str) -> Option<SigningKey> {
        match self {
            Self::InMemory(store) => store.get(kid).await,
            Self::Null(store) => store.get(kid).await,
        }
    }

    async fn insert(&self, key: SigningKey) {
        match self {
            Self::InMemory(store) => store.insert(key).await,
            Self::Null(store) => store.insert(key).await,
        }
    }

    async fn clear(&self) {
        match self {
            Self::InMemory(store) => store.clear().await,
            Self::Null(store) => store.clear().await,
        }
    }
}

/// Factory function creating the appropriate store for the configuration.
pub fn create_store(config: &CacheConfig) -> KeyStore {
    match config.store {
        CacheStore::InMemory => KeyStore::InMemory(memory::InMemoryKeyStore::new(
            config.ttl as u64,
            config.memory.capacity,
        )),
        CacheStore::None => KeyStore::Null(null::NullKeyStore::new()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::InMemoryConfig;

    fn test_key(kid: &str) -> SigningKey {
        SigningKey::new(
            kid.to_string(),
            "RS256".to_string(),
            DecodingKey::from_secret(b"test-material"),
        )
    }

    #[test]
    fn test_create_store_from_config() {
        let config = CacheConfig {
            ttl: 60,
            store: CacheStore::InMemory,
            memory: InMemoryConfig { capacity: 8 },
        };
        assert!(matches!(create_store(&config), KeyStore::InMemory(_)));

        let config = CacheConfig {
            store: CacheStore::None,
            ..config
        };
        assert!(matches!(create_store(&config), KeyStore::Null(_)));
    }

    #[tokio::test]
    async fn test_store_dispatch_round_trip() {
        let store = KeyStore::InMemory(memory::InMemoryKeyStore::new(60, 8));

        store.insert(test_key("kid-1")).await;
        let found = store.get("kid-1").await.expect("key should be cached");
        assert_eq!(found.key_id(), "kid-1");
        assert_eq!(found.algorithm(), "RS256");

        assert!(store.get("kid-2").await.is_none());

        store.clear().await;
        assert!(store.get("kid-1").await.is_none());
    }

    #[test]
    fn test_signing_key_debug_hides_material() {
        let rendered = format!("{:?}", test_key("kid-1"));
        assert!(rendered.contains("kid-1"));
        assert!(!rendered.contains("test-material"));
    }
}
