//! The request router / cache strategy engine
//!
//! Intercepts every outgoing GET request and decides how to satisfy it.
//! Classification picks a strategy; each strategy degrades through a chain
//! of fallbacks so the caller always gets a response, never an error.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use url::Url;

use studysync_core::config::RouterConfig;
use studysync_core::domain::{
    CachePartition, CachedResponse, DomainError, GenerationTag, RequestKey,
};
use studysync_core::ports::{
    FetchedResponse, IHttpFetcher, IResponseCache, OutboundRequest, RequestDestination,
};

use crate::classify::{RequestClass, RequestClassifier};
use crate::fallback;

// ============================================================================
// Response types
// ============================================================================

/// Where a routed response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Fetched live from the network
    Network,
    /// Served from a cache partition
    Cache,
    /// Synthesized fallback (offline document, placeholder, offline JSON)
    Fallback,
}

/// The response handed back to the intercepted caller
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub source: ResponseSource,
}

impl RoutedResponse {
    fn from_network(response: FetchedResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            headers: response.headers,
            body: response.body,
            source: ResponseSource::Network,
        }
    }

    fn from_cache(entry: CachedResponse) -> Self {
        Self {
            status: entry.status,
            content_type: entry.content_type,
            headers: entry.headers,
            body: entry.body,
            source: ResponseSource::Cache,
        }
    }
}

/// Outcome of routing one request
#[derive(Debug, Clone, PartialEq)]
pub enum RouterDecision {
    /// Not intercepted: the caller sends the request untouched
    Passthrough,
    /// Intercepted and answered
    Respond(RoutedResponse),
}

// ============================================================================
// RequestRouter
// ============================================================================

/// Routes intercepted requests through the configured cache strategies
///
/// Construct only after [`GenerationManager::activate`](crate::generation::GenerationManager::activate)
/// has completed; stale generations must be gone before traffic is served
/// under the new one.
pub struct RequestRouter {
    cache: Arc<dyn IResponseCache>,
    fetcher: Arc<dyn IHttpFetcher>,
    classifier: RequestClassifier,
    generation: GenerationTag,
    offline_document_key: RequestKey,
}

impl RequestRouter {
    /// Builds a router from the validated configuration
    pub fn new(
        config: &RouterConfig,
        cache: Arc<dyn IResponseCache>,
        fetcher: Arc<dyn IHttpFetcher>,
    ) -> Result<Self, DomainError> {
        let generation = GenerationTag::new(config.generation.clone())?;
        let origin = Url::parse(&config.app_origin)
            .map_err(|e| DomainError::InvalidRequestKey(format!("app origin: {e}")))?;
        let offline_url = origin
            .join(&config.offline_document)
            .map_err(|e| DomainError::InvalidRequestKey(format!("offline document: {e}")))?;

        Ok(Self {
            cache,
            fetcher,
            classifier: RequestClassifier::new(config),
            generation,
            offline_document_key: RequestKey::get(&offline_url),
        })
    }

    /// Routes one request
    ///
    /// Never returns an error: interception either declines
    /// ([`RouterDecision::Passthrough`]) or produces a response through the
    /// strategy's fallback chain.
    pub async fn handle(&self, request: &OutboundRequest) -> RouterDecision {
        let class = self.classifier.classify(request);
        debug!(request = %request, class = ?class, "Routing request");

        let response = match class {
            RequestClass::Passthrough => return RouterDecision::Passthrough,
            RequestClass::StaticAsset => {
                self.cache_first(CachePartition::Static, request).await
            }
            RequestClass::Api => self.network_first(request, false).await,
            RequestClass::Asset => self.cache_first(CachePartition::Dynamic, request).await,
            RequestClass::Default => self.network_first(request, true).await,
        };

        RouterDecision::Respond(response)
    }

    // ------------------------------------------------------------------------
    // Strategies
    // ------------------------------------------------------------------------

    /// Cache-first: cached copy wins; a miss fetches and stores a copy
    async fn cache_first(
        &self,
        partition: CachePartition,
        request: &OutboundRequest,
    ) -> RoutedResponse {
        let key = request.cache_key();

        match self.cache.get(partition, &key).await {
            Ok(Some(entry)) => return RoutedResponse::from_cache(entry),
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Cache read failed"),
        }

        match self.fetcher.fetch(request).await {
            Ok(fetched) => {
                self.store_copy(partition, &key, &fetched).await;
                RoutedResponse::from_network(fetched)
            }
            Err(e) => {
                debug!(request = %request, error = %e, "Cache-first total failure");
                self.total_failure(request).await
            }
        }
    }

    /// Network-first: fresh data wins; failures fall back to the cached
    /// copy, then to the offline document (`document_fallback`) or the
    /// structured offline error
    async fn network_first(
        &self,
        request: &OutboundRequest,
        document_fallback: bool,
    ) -> RoutedResponse {
        let key = request.cache_key();

        match self.fetcher.fetch(request).await {
            Ok(fetched) => {
                // Only successful responses are worth replaying offline.
                if fetched.is_success() {
                    self.store_copy(CachePartition::Dynamic, &key, &fetched).await;
                }
                RoutedResponse::from_network(fetched)
            }
            Err(e) => {
                debug!(request = %request, error = %e, "Network-first falling back to cache");
                match self.cache.get(CachePartition::Dynamic, &key).await {
                    Ok(Some(entry)) => RoutedResponse::from_cache(entry),
                    Ok(None) => {
                        if document_fallback {
                            self.offline_document().await
                        } else {
                            fallback::offline_api_error()
                        }
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Cache read failed");
                        if document_fallback {
                            self.offline_document().await
                        } else {
                            fallback::offline_api_error()
                        }
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Fallback chain
    // ------------------------------------------------------------------------

    /// Last resort when neither cache nor network produced anything
    async fn total_failure(&self, request: &OutboundRequest) -> RoutedResponse {
        if request.is_navigation {
            self.offline_document().await
        } else if request.destination == RequestDestination::Image {
            fallback::placeholder_image()
        } else {
            fallback::offline_api_error()
        }
    }

    /// The designated offline fallback document
    ///
    /// Served from the static partition when it was primed there; the
    /// built-in document covers a cache that was never populated.
    async fn offline_document(&self) -> RoutedResponse {
        match self
            .cache
            .get(CachePartition::Static, &self.offline_document_key)
            .await
        {
            Ok(Some(entry)) => RoutedResponse::from_cache(entry),
            _ => fallback::builtin_offline_document(),
        }
    }

    /// Stores a response copy, logging rather than propagating failures
    async fn store_copy(
        &self,
        partition: CachePartition,
        key: &RequestKey,
        fetched: &FetchedResponse,
    ) {
        let entry = CachedResponse {
            key: key.clone(),
            partition,
            generation: self.generation.clone(),
            status: fetched.status,
            content_type: fetched.content_type.clone(),
            headers: fetched.headers.clone(),
            body: fetched.body.clone(),
            inserted_at: Utc::now(),
        };

        if let Err(e) = self.cache.put(&entry).await {
            warn!(key = %key, error = %e, "Failed to cache response copy");
        }
    }
}
