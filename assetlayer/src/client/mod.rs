//! Asset client facade.
//!
//! [`AssetClient`] composes the response cache, the request coalescer and
//! the retrying transport behind typed read operations:
//!
//! ```text
//! get_* ──► cache hit? ──yes──────────────────────────────► payload
//!               │
//!               no
//!               ▼
//!         in flight? ──yes──► await leader's outcome ──────► payload | None
//!               │
//!               no (lead)
//!               ▼
//!         transport (timeout + retry) ──► decode ──► cache ──► payload | None
//! ```
//!
//! Every failure resolves to `None` (or a failed [`BatchResult`]); nothing
//! here panics or returns an error to the caller of a read operation.
//!
//! # Example
//!
//! ```ignore
//! use assetlayer::client::AssetClient;
//! use assetlayer::config::ClientConfig;
//!
//! let client = AssetClient::new(ClientConfig::new("http://localhost:5200"))?;
//! if let Some(map) = client.get_entity("map", "100000000").await {
//!     println!("{map}");
//! }
//! println!("{}", client.diagnostics());
//! ```

mod batch;
mod envelope;

pub use batch::{
    BatchItem, BatchResult, BATCH_REQUEST_FAILED, MALFORMED_BATCH_RESPONSE, NETWORK_ERROR,
    UNKNOWN_ERROR,
};
pub use envelope::ApiError;

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheKey, RecencyCache, API_PREFIX};
use crate::coalesce::{CoalesceResult, RequestCoalescer};
use crate::config::{ClientConfig, ConfigError};
use crate::telemetry::{ClientDiagnostics, ClientMetrics};
use crate::transport::{
    HttpTransport, ReqwestTransport, RetryPolicy, RetryingTransport, TransportError,
    TransportRequest,
};
use envelope::Envelope;

/// Wildcard accepted by [`AssetClient::invalidate`] to clear everything.
pub const INVALIDATE_ALL: &str = "*";

/// Errors raised while constructing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Cached response payload.
#[derive(Clone, Debug)]
enum Payload {
    Document(Arc<Value>),
    Blob(Bytes),
}

/// Caching, coalescing client for the remote asset API.
///
/// All state is owned by the instance. The client is `Send + Sync`; share it
/// between tasks with an `Arc`.
pub struct AssetClient {
    config: ClientConfig,
    transport: RetryingTransport,
    cache: Mutex<RecencyCache<CacheKey, Payload>>,
    coalescer: RequestCoalescer<CacheKey, Option<Payload>>,
    metrics: ClientMetrics,
}

impl AssetClient {
    /// Create a client that talks HTTP through reqwest.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        let transport = RetryingTransport::new(
            config.base_url.clone(),
            transport,
            RetryPolicy::exponential(config.max_retries),
            config.timeout(),
        )
        .with_tracing(config.tracing);

        debug!(
            base_url = %config.base_url,
            max_cache_entries = config.max_cache_entries,
            timeout_ms = config.timeout_ms,
            max_retries = config.max_retries,
            "Asset client created"
        );

        Ok(Self {
            cache: Mutex::new(RecencyCache::new(config.max_cache_entries)),
            coalescer: RequestCoalescer::new(),
            metrics: ClientMetrics::new(),
            transport,
            config,
        })
    }

    /// The configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch a whole entity.
    pub async fn get_entity(&self, asset_type: &str, id: &str) -> Option<Arc<Value>> {
        self.fetch_document(CacheKey::entity(asset_type, id)).await
    }

    /// Fetch one section of an entity.
    pub async fn get_section(
        &self,
        asset_type: &str,
        id: &str,
        section: &str,
    ) -> Option<Arc<Value>> {
        self.fetch_document(CacheKey::section(asset_type, id, section))
            .await
    }

    /// Fetch an entity and decode it into `T`.
    ///
    /// Returns `None` if the entity is unavailable or does not match `T`.
    pub async fn get_entity_as<T: DeserializeOwned>(&self, asset_type: &str, id: &str) -> Option<T> {
        let value = self.get_entity(asset_type, id).await?;
        decode_document(&value)
    }

    /// Fetch a section and decode it into `T`.
    pub async fn get_section_as<T: DeserializeOwned>(
        &self,
        asset_type: &str,
        id: &str,
        section: &str,
    ) -> Option<T> {
        let value = self.get_section(asset_type, id, section).await?;
        decode_document(&value)
    }

    /// Fetch a content-addressed blob.
    pub async fn get_blob(&self, hash: &str) -> Option<Bytes> {
        match self.fetch_cached(CacheKey::blob(hash)).await? {
            Payload::Blob(bytes) => Some(bytes),
            Payload::Document(_) => None,
        }
    }

    /// Fetch several entities or sections in one call.
    ///
    /// Always issues exactly one transport call, bypassing the cache and the
    /// coalescer. The result has the same length and order as `items`.
    pub async fn batch(&self, items: &[BatchItem]) -> Vec<BatchResult> {
        self.metrics.request_issued();

        let body = match serde_json::to_vec(items) {
            Ok(body) => body,
            Err(error) => {
                self.metrics.error_recorded();
                warn!(error = %error, "Failed to encode batch request");
                return BatchResult::failed_all(items.len(), NETWORK_ERROR);
            }
        };
        let request = TransportRequest::post_json(format!("{}/batch", API_PREFIX), body);

        let response = match self.transport.execute(&request).await {
            Ok(response) => response,
            Err(error) => {
                self.metrics.error_recorded();
                warn!(items = items.len(), error = %error, "Batch request failed");
                return BatchResult::failed_all(items.len(), NETWORK_ERROR);
            }
        };

        match batch::results_from_response(items.len(), &response) {
            Ok(results) => {
                debug!(
                    items = items.len(),
                    status = response.status,
                    succeeded = results.iter().filter(|r| r.is_ok()).count(),
                    "Batch request completed"
                );
                results
            }
            Err(error) => {
                self.metrics.error_recorded();
                warn!(items = items.len(), error = %error, "Malformed batch response");
                BatchResult::failed_all(items.len(), MALFORMED_BATCH_RESPONSE)
            }
        }
    }

    /// Invalidate cached entries.
    ///
    /// `""` and [`INVALIDATE_ALL`] clear the whole cache; anything else is
    /// parsed as the text form of a [`CacheKey`] (e.g. `entity:map:100`)
    /// and that single entry is removed. Prefixes are not matched.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, key: &str) -> usize {
        if key.is_empty() || key == INVALIDATE_ALL {
            return self.clear_cache();
        }

        match key.parse::<CacheKey>() {
            Ok(key) => usize::from(self.invalidate_key(&key)),
            Err(error) => {
                debug!(key, error = %error, "Ignoring invalidation of unparseable key");
                0
            }
        }
    }

    /// Remove one cached entry. Returns `true` if it was present.
    pub fn invalidate_key(&self, key: &CacheKey) -> bool {
        let removed = self.cache.lock().delete(key);
        debug!(key = %key, removed, "Cache entry invalidated");
        removed
    }

    /// Remove every cached entry, returning how many were removed.
    ///
    /// Hit, miss and eviction counters keep their values.
    pub fn clear_cache(&self) -> usize {
        let mut cache = self.cache.lock();
        let removed = cache.len();
        cache.clear();
        drop(cache);

        debug!(removed, "Cache cleared");
        removed
    }

    /// Snapshot of cache statistics, in-flight count and request counters.
    pub fn diagnostics(&self) -> ClientDiagnostics {
        let cache = self.cache.lock().stats();
        ClientDiagnostics {
            cache,
            in_flight_requests: self.coalescer.in_flight_count(),
            total_requests: self.metrics.total_requests(),
            total_errors: self.metrics.total_errors(),
            coalesced_requests: self.metrics.coalesced_requests(),
        }
    }

    async fn fetch_document(&self, key: CacheKey) -> Option<Arc<Value>> {
        match self.fetch_cached(key).await? {
            Payload::Document(value) => Some(value),
            Payload::Blob(_) => None,
        }
    }

    /// Cache check, then coalesce check, then fetch.
    async fn fetch_cached(&self, key: CacheKey) -> Option<Payload> {
        let Some(path) = key.request_path() else {
            debug!(key = %key, "Key has no addressable request path");
            return None;
        };

        let cached = self.cache.lock().get(&key).cloned();
        if let Some(payload) = cached {
            debug!(key = %key, "Cache hit");
            return Some(payload);
        }

        match self.coalescer.register(key.clone()) {
            CoalesceResult::Coalesced(mut rx) => {
                self.metrics.request_coalesced();
                debug!(key = %key, "Joined in-flight request");
                match rx.recv().await {
                    Ok(outcome) => outcome,
                    Err(error) => {
                        debug!(key = %key, error = %error, "Leader dropped before completing");
                        None
                    }
                }
            }
            CoalesceResult::NewRequest(slot) => {
                // A previous leader may have settled between the miss and
                // the registration
                let settled = self.cache.lock().peek(&key).cloned();
                if let Some(payload) = settled {
                    slot.complete(Some(payload.clone()));
                    return Some(payload);
                }

                self.metrics.request_issued();
                let outcome = self.fetch(&key, path).await;

                if let Some(payload) = &outcome {
                    let evicted = self.cache.lock().set(key.clone(), payload.clone());
                    if let Some(evicted) = evicted {
                        debug!(key = %key, evicted = %evicted, "Cache entry evicted");
                    }
                }

                let waiters = slot.complete(outcome.clone());
                if waiters > 0 {
                    debug!(key = %key, waiters, "Shared outcome with coalesced requests");
                }
                outcome
            }
        }
    }

    /// Issue the network call for `key` and decode the response.
    async fn fetch(&self, key: &CacheKey, path: String) -> Option<Payload> {
        let request = TransportRequest::get(path);

        let response = match self.transport.execute(&request).await {
            Ok(response) => response,
            Err(error) => {
                self.metrics.error_recorded();
                warn!(key = %key, error = %error, "Asset request failed");
                return None;
            }
        };

        if !response.is_success() {
            debug!(key = %key, status = response.status, "Asset unavailable");
            return None;
        }

        if key.is_blob() {
            return Some(Payload::Blob(response.body));
        }

        let envelope: Envelope = match response.json() {
            Ok(envelope) => envelope,
            Err(error) => {
                self.metrics.error_recorded();
                warn!(key = %key, error = %error, "Malformed asset response");
                return None;
            }
        };

        if !envelope.ok {
            debug!(
                key = %key,
                message = envelope.error_message().unwrap_or_default(),
                "Asset not found"
            );
            return None;
        }

        envelope
            .into_data()
            .map(|data| Payload::Document(Arc::new(data)))
    }
}

fn decode_document<T: DeserializeOwned>(value: &Value) -> Option<T> {
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            debug!(error = %error, "Asset payload does not match requested type");
            None
        }
    }
}
