use super::{KeyStoreBackend, SigningKey};
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::time::Duration;

#[derive(Clone)]
pub struct InMemoryKeyStore {
    cache: MokaCache<String, SigningKey>,
}

impl InMemoryKeyStore {
    /// Initialize a new in-memory key store.
    ///
    /// Entries expire `ttl_secs` after insertion, bounding how long a
    /// rotated-out provider key keeps verifying tokens.
    pub fn new(ttl_secs: u64, capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(Duration::from_secs(ttl_secs))
            .max_capacity(capacity)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl KeyStoreBackend for InMemoryKeyStore {
    async fn get(&self, kid: &str) -> Option<SigningKey> {
        self.cache.get(kid).await
    }

    async fn insert(&self, key: SigningKey) {
        self.cache.insert(key.key_id().to_string(), key).await;
    }

    async fn clear(&self) {
        self.cache.invalidate_all();
    }
}
