// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behaviour
//!
//! - Keys are cached with a configurable TTL
//! - A token signed with an unknown `kid` forces one refresh (keys rotated),
//!   at most once per minimum refresh interval
//! - Only one refresh runs at a time; concurrent callers wait and reuse it
//! - Stale cache (up to 24h old) is used on fetch failure
//! - A failed fetch is not retried until the minimum refresh interval passes
//!
//! Readers take the cache's read lock only; verification never waits on
//! another verification.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Default JWKS cache TTL (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Minimum age of the cache before an unknown `kid` may trigger a refetch,
/// and the wait after a failed fetch before another is attempted.
const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Maximum age of a cached key set served after a failed refresh.
const MAX_STALE_AGE: Duration = Duration::from_secs(24 * 3600);

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Key-set retrieval failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwksError {
    #[error("failed to build JWKS HTTP client: {0}")]
    Client(String),

    #[error("failed to fetch JWKS: {0}")]
    Fetch(String),

    #[error("no key with kid '{0}' in JWKS")]
    NoMatchingKey(String),

    #[error("unsupported key in JWKS: {0}")]
    UnsupportedKey(String),
}

/// JWKS cache entry.
struct CacheEntry {
    jwks: Arc<JwkSet>,
    fetched_at: Instant,
}

/// The most recent fetch that failed.
struct FailedFetch {
    at: Instant,
    error: JwksError,
}

/// Signing-key availability as verification sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySetStatus {
    /// Cached within the TTL.
    Fresh,
    /// Past the TTL and the endpoint is failing, but still served.
    Stale,
    Unavailable,
}

impl KeySetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "ok",
            Self::Stale => "stale",
            Self::Unavailable => "unavailable",
        }
    }
}

/// JWKS manager with caching.
///
/// Cloning is cheap and clones share the same cache.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS URL (user pool endpoint)
    jwks_url: String,
    /// Cache TTL
    cache_ttl: Duration,
    /// Minimum cache age before an unknown kid refetches; also the retry
    /// delay after a failed fetch
    min_refresh_interval: Duration,
    /// Cached JWKS
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Held while a fetch is in flight; remembers the last failed fetch
    refresh_lock: Arc<Mutex<Option<FailedFetch>>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL (e.g., `https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_AbC123/.well-known/jwks.json`)
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| JwksError::Client(e.to_string()))?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            cache: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(None)),
            client,
        })
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set how old the cache must be before an unknown kid refetches.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Get a decoding key for the given key ID.
    pub async fn get_decoding_key(&self, kid: &str) -> Result<(DecodingKey, Algorithm), JwksError> {
        let jwks = self.get_jwks().await?;
        if let Some(jwk) = jwks.find(kid) {
            return jwk_to_decoding_key(jwk);
        }

        // Unknown kid: the pool may have rotated its keys.
        debug!(kid, "kid not in cached JWKS, refreshing");
        let jwks = self.refresh_if_older_than(self.min_refresh_interval).await?;
        let jwk = jwks
            .find(kid)
            .ok_or_else(|| JwksError::NoMatchingKey(kid.to_string()))?;
        jwk_to_decoding_key(jwk)
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), JwksError> {
        let mut last_failure = self.refresh_lock.lock().await;
        self.fetch_and_store(&mut last_failure).await.map(|_| ())
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.cached_within(self.cache_ttl).await.is_some()
    }

    /// Report key availability, refetching through the same rate-limited
    /// path verification uses.
    pub async fn status(&self) -> KeySetStatus {
        match self.get_jwks().await {
            Ok(_) if self.is_cached().await => KeySetStatus::Fresh,
            Ok(_) => KeySetStatus::Stale,
            Err(_) => KeySetStatus::Unavailable,
        }
    }

    /// Fetch JWKS (with caching).
    async fn get_jwks(&self) -> Result<Arc<JwkSet>, JwksError> {
        if let Some(jwks) = self.cached_within(self.cache_ttl).await {
            return Ok(jwks);
        }
        self.refresh_if_older_than(self.cache_ttl).await
    }

    async fn cached_within(&self, max_age: Duration) -> Option<Arc<JwkSet>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < max_age)
            .map(|entry| Arc::clone(&entry.jwks))
    }

    /// Refetch unless the cache is younger than `max_age`.
    ///
    /// Serialized by `refresh_lock`; a caller that waited re-checks the cache
    /// first, so a burst of misses costs a single fetch. After a failed fetch,
    /// callers within `min_refresh_interval` reuse its outcome instead of
    /// fetching again.
    async fn refresh_if_older_than(&self, max_age: Duration) -> Result<Arc<JwkSet>, JwksError> {
        let mut last_failure = self.refresh_lock.lock().await;

        if let Some(jwks) = self.cached_within(max_age).await {
            return Ok(jwks);
        }

        let recent_failure = last_failure
            .as_ref()
            .filter(|failure| failure.at.elapsed() < self.min_refresh_interval)
            .map(|failure| failure.error.clone());

        let error = match recent_failure {
            Some(error) => error,
            None => match self.fetch_and_store(&mut last_failure).await {
                Ok(jwks) => return Ok(jwks),
                Err(e) => e,
            },
        };

        match self.cached_within(MAX_STALE_AGE).await {
            Some(stale) => {
                debug!(url = %self.jwks_url, "serving stale JWKS");
                Ok(stale)
            }
            None => Err(error),
        }
    }

    /// Fetch and cache the key set. Caller holds `refresh_lock`.
    async fn fetch_and_store(
        &self,
        last_failure: &mut Option<FailedFetch>,
    ) -> Result<Arc<JwkSet>, JwksError> {
        match self.fetch_jwks().await {
            Ok(jwks) => {
                *last_failure = None;
                Ok(self.store(jwks).await)
            }
            Err(e) => {
                warn!(error = %e, url = %self.jwks_url, "JWKS fetch failed");
                *last_failure = Some(FailedFetch {
                    at: Instant::now(),
                    error: e.clone(),
                });
                Err(e)
            }
        }
    }

    async fn store(&self, jwks: JwkSet) -> Arc<JwkSet> {
        let jwks = Arc::new(jwks);
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: Arc::clone(&jwks),
            fetched_at: Instant::now(),
        });
        debug!(keys = jwks.keys.len(), url = %self.jwks_url, "JWKS cached");
        jwks
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, JwksError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::Fetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| JwksError::Fetch(e.to_string()))
    }
}

/// Convert a JWK to a DecodingKey.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), JwksError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|e| JwksError::UnsupportedKey(format!("bad RSA components: {e}")))?;

            let alg = match jwk.common.key_algorithm {
                None | Some(KeyAlgorithm::RS256) => Algorithm::RS256,
                Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                Some(other) => {
                    return Err(JwksError::UnsupportedKey(format!(
                        "algorithm {other:?} on an RSA key"
                    )))
                }
            };

            Ok((key, alg))
        }
        _ => Err(JwksError::UnsupportedKey(
            "only RSA signing keys are supported".to_string(),
        )),
    }
}
