//! Caching layer for PRIM responses.
//!
//! Upstream data changes at very different rates: passages every few
//! seconds, line stop lists a few times a year. Each cached response lives
//! for its endpoint's `server_revalidate` interval, so one cache serves
//! every endpoint.
//!
//! Only success responses are cached. Errors always go back upstream.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::prim::{Endpoint, RefreshIntervals, Transport, TransportError, TransportResponse};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness of each endpoint.
    pub refresh: RefreshIntervals,

    /// Maximum number of cached responses.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshIntervals::default(),
            max_capacity: 1000,
        }
    }
}

/// Time to live of a cached URL, from the endpoint it belongs to.
fn ttl_for(refresh: &RefreshIntervals, url: &str) -> Option<Duration> {
    let endpoint = Endpoint::from_url(url)?;
    let ttl = Duration::from_secs(refresh.for_endpoint(endpoint).server_revalidate);
    (!ttl.is_zero()).then_some(ttl)
}

struct EndpointExpiry {
    refresh: RefreshIntervals,
}

impl Expiry<String, TransportResponse> for EndpointExpiry {
    fn expire_after_create(
        &self,
        key: &String,
        _value: &TransportResponse,
        _created_at: Instant,
    ) -> Option<Duration> {
        ttl_for(&self.refresh, key)
    }
}

/// Transport decorator answering repeated GETs from memory.
///
/// Keyed by URL. Headers are not part of the key: a process talks to PRIM
/// with a single API key.
pub struct CachingTransport<T> {
    inner: T,
    responses: MokaCache<String, TransportResponse>,
    refresh: RefreshIntervals,
}

impl<T> CachingTransport<T> {
    /// Wrap `inner` with a cache.
    pub fn new(inner: T, config: &CacheConfig) -> Self {
        let responses = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EndpointExpiry {
                refresh: config.refresh,
            })
            .build();

        Self {
            inner,
            responses,
            refresh: config.refresh,
        }
    }
}

impl<T> std::fmt::Debug for CachingTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingTransport")
            .field("entries", &self.responses.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Transport> Transport for CachingTransport<T> {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse, TransportError> {
        if let Some(cached) = self.responses.get(url).await {
            debug!(url, "cache hit");
            return Ok(cached);
        }

        let response = self.inner.get(url, headers).await?;

        if response.is_success() && ttl_for(&self.refresh, url).is_some() {
            self.responses
                .insert(url.to_string(), response.clone())
                .await;
        }

        Ok(response)
    }
}
