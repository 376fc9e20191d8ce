use serde::Deserialize;

/// Specifies which signing-key store implementation to use
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStore {
    #[default]
    InMemory,
    #[serde(other)]
    None,
}

/// Configuration for the signing-key cache
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Signing-key TTL in seconds (default: 1 hour)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Store type: "in-memory" (default) or "none"
    #[serde(default)]
    pub store: CacheStore,

    /// In-memory store specific configuration
    #[serde(default)]
    pub memory: InMemoryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            store: CacheStore::default(),
            memory: InMemoryConfig::default(),
        }
    }
}

/// In-memory store configuration options
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InMemoryConfig {
    /// Maximum number of cached signing keys (default: 64)
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_ttl() -> u32 {
    3600
}

fn default_capacity() -> u64 {
    64
}
