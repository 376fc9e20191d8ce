use serde::Deserialize;

/// JWKS endpoint location and fetch policy
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct JwksConfig {
    /// URL of the provider's JWKS endpoint
    #[serde(default)]
    pub url: String,

    /// Per-attempt fetch timeout in seconds (default: 10)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Connection timeout in seconds (default: 2)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Additional fetch attempts after a failed one (default: 2)
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Initial delay between fetch attempts in milliseconds, doubled per
    /// retry (default: 100)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Minimum interval in seconds between refresh attempts after a failed
    /// fetch, so an unreachable endpoint is not hammered (default: 10)
    #[serde(default = "default_min_refresh_interval")]
    pub min_refresh_interval: u64,

    /// Re-fetch the key set once when a token references an unknown `kid`;
    /// providers rotate keys (default: true)
    #[serde(default = "default_refresh_on_miss")]
    pub refresh_on_miss: bool,
}

impl Default for JwksConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            fetch_timeout: default_fetch_timeout(),
            connect_timeout: default_connect_timeout(),
            fetch_retries: default_fetch_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            min_refresh_interval: default_min_refresh_interval(),
            refresh_on_miss: default_refresh_on_miss(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    2
}

fn default_fetch_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    100
}

fn default_min_refresh_interval() -> u64 {
    10
}

fn default_refresh_on_miss() -> bool {
    true
}
