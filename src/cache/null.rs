use super::{KeyStoreBackend, SigningKey};
use async_trait::async_trait;

/// No-op store: retains nothing, so every verification re-fetches the key
/// set. Useful when operators want provider key rotation picked up
/// immediately and accept the extra fetch latency.
#[derive(Clone, Default)]
pub struct NullKeyStore;

impl NullKeyStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeyStoreBackend for NullKeyStore {
    async fn get(&self, _kid: &str) -> Option<SigningKey> {
        None
    }

    async fn insert(&self, _key: SigningKey) {}

    async fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::DecodingKey;

    #[tokio::test]
    async fn test_null_store_never_retains() {
        let store = NullKeyStore::new();
        store
            .insert(SigningKey::new(
                "kid-a".to_string(),
                "RS256".to_string(),
                DecodingKey::from_secret(b"secret"),
            ))
            .await;
        assert!(store.get("kid-a").await.is_none());
    }
}
