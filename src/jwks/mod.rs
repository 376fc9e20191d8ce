use crate::cache::{create_store, KeyStore, KeyStoreBackend, SigningKey};
use crate::config::{AuthConfig, JwksConfig};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use log::{debug, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

/// Errors that can occur while resolving provider signing keys
#[derive(Debug, Error)]
pub enum KeyError {
    /// The JWKS endpoint was unreachable, timed out, answered non-2xx, or
    /// returned an unparseable document
    #[error("failed to fetch key set from {url}: {reason}")]
    Fetch { url: String, reason: String },
    /// No key in the set matches the requested `kid`
    #[error("no signing key found for kid '{kid}'")]
    NotFound { kid: String },
}

impl KeyError {
    /// Fetch failures are transient; a missing `kid` is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

#[derive(Default)]
struct RefreshState {
    /// Set after the first successful fetch; gates miss-triggered re-fetches
    /// when `refresh_on_miss` is disabled.
    primed: bool,
    /// When the last fetch failed, so repeated misses against a dead
    /// endpoint are rate-limited.
    last_failure: Option<Instant>,
}

/// Process-wide cache of a provider's published signing keys.
///
/// Populated on first use, shared across all verifications, and refreshed
/// through `refresh()`/`invalidate()` or on an unknown `kid` (key rotation).
/// Lookups read the store directly and never wait behind an in-flight
/// refresh; refreshes themselves are single-flight behind a mutex.
#[derive(Clone)]
pub struct JwksCache {
    client: reqwest::Client,
    url: Url,
    store: KeyStore,
    config: JwksConfig,
    refresh: Arc<Mutex<RefreshState>>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("url", &self.url)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwksCache {
    pub fn new(config: &AuthConfig) -> Result<Self, String> {
        let url = Url::parse(&config.jwks.url)
            .map_err(|e| format!("invalid JWKS URL '{}': {e}", config.jwks.url))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.jwks.fetch_timeout))
            .connect_timeout(Duration::from_secs(config.jwks.connect_timeout))
            .build()
            .map_err(|e| format!("failed to create JWKS HTTP client: {e}"))?;

        Ok(Self {
            client,
            url,
            store: create_store(&config.cache),
            config: config.jwks.clone(),
            refresh: Arc::new(Mutex::new(RefreshState::default())),
        })
    }

    /// Resolve a signing key by `kid`, fetching the key set on first use.
    ///
    /// An unknown `kid` forces one re-fetch before failing with `NotFound`,
    /// unless `refresh_on_miss` is disabled, in which case only the initial
    /// fetch ever happens.
    pub async fn get_signing_key(&self, kid: &str) -> Result<SigningKey, KeyError> {
        if let Some(key) = self.store.get(kid).await {
            return Ok(key);
        }

        let mut state = self.refresh.lock().await;

        // Another task may have refreshed while we waited on the lock.
        if let Some(key) = self.store.get(kid).await {
            return Ok(key);
        }

        if state.primed && !self.config.refresh_on_miss {
            return Err(KeyError::NotFound {
                kid: kid.to_string(),
            });
        }

        if let Some(failed_at) = state.last_failure {
            if failed_at.elapsed() < Duration::from_secs(self.config.min_refresh_interval) {
                return Err(KeyError::NotFound {
                    kid: kid.to_string(),
                });
            }
        }

        let loaded = self.fetch_into_store(&mut state).await?;
        drop(state);

        // Resolve against the freshly fetched set rather than the store, so
        // the no-op store backend still serves lookups.
        loaded
            .into_iter()
            .find(|key| key.key_id() == kid)
            .ok_or_else(|| KeyError::NotFound {
                kid: kid.to_string(),
            })
    }

    /// Force a re-fetch of the key set, replacing cached entries.
    /// Returns the number of usable keys loaded.
    pub async fn refresh(&self) -> Result<usize, KeyError> {
        let mut state = self.refresh.lock().await;
        Ok(self.fetch_into_store(&mut state).await?.len())
    }

    /// Drop every cached key; the next verification fetches a fresh set.
    pub async fn invalidate(&self) {
        self.store.clear().await;
        let mut state = self.refresh.lock().await;
        state.primed = false;
        state.last_failure = None;
    }

    /// Prefetch the key set at startup. An unreachable endpoint is logged
    /// rather than fatal; the first verification retries.
    pub async fn warm(&self) -> usize {
        match self.refresh().await {
            Ok(count) => count,
            Err(e) => {
                warn!("JWKS warm-up failed: {e}");
                0
            }
        }
    }

    /// Fetch the key set (with bounded retries) and store the usable keys,
    /// returning them. Callers must hold the refresh lock.
    async fn fetch_into_store(&self, state: &mut RefreshState) -> Result<Vec<SigningKey>, KeyError> {
        let jwk_set = match self.fetch_key_set().await {
            Ok(set) => set,
            Err(e) => {
                state.last_failure = Some(Instant::now());
                return Err(e);
            }
        };
        state.primed = true;
        state.last_failure = None;

        let mut loaded = Vec::with_capacity(jwk_set.keys.len());
        for jwk in &jwk_set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                debug!("skipping JWK without kid");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(decoding_key) => {
                    let algorithm = jwk
                        .common
                        .key_algorithm
                        .as_ref()
                        .map(|alg| format!("{alg:?}"))
                        .unwrap_or_else(|| "unknown".to_string());
                    let key = SigningKey::new(kid, algorithm, decoding_key);
                    self.store.insert(key.clone()).await;
                    loaded.push(key);
                }
                Err(e) => debug!("skipping JWK '{kid}': {e}"),
            }
        }
        debug!("loaded {} signing keys from {}", loaded.len(), self.url);
        Ok(loaded)
    }

    /// One GET to the JWKS endpoint per attempt, retried with doubling
    /// backoff up to `fetch_retries` extra times. Signature validation is
    /// deterministic and never retried; only this network call is.
    async fn fetch_key_set(&self) -> Result<JwkSet, KeyError> {
        let mut attempt: u32 = 0;
        let mut backoff = Duration::from_millis(self.config.retry_backoff_ms);
        loop {
            match self.try_fetch_key_set().await {
                Ok(set) => return Ok(set),
                Err(e) if attempt < self.config.fetch_retries => {
                    attempt += 1;
                    warn!("JWKS fetch attempt {attempt} failed, retrying in {backoff:?}: {e}");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_fetch_key_set(&self) -> Result<JwkSet, KeyError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.fetch_error(format!("HTTP {}", response.status())));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| self.fetch_error(format!("invalid key set document: {e}")))
    }

    fn fetch_error(&self, reason: String) -> KeyError {
        KeyError::Fetch {
            url: self.url.to_string(),
            reason,
        }
    }
}
