//! Cache-generation lifecycle
//!
//! A deployment ships with a generation tag. At startup the manager primes
//! the static allow-list into the `static` partition under that tag, then
//! retires every entry belonging to any other generation. The caller must
//! let [`GenerationManager::activate`] finish before constructing the
//! router: serving from a stale generation while it is being deleted is
//! disallowed.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{debug, info, warn};
use url::Url;

use studysync_core::config::RouterConfig;
use studysync_core::domain::{CachePartition, CachedResponse, GenerationTag};
use studysync_core::ports::{IHttpFetcher, IResponseCache, OutboundRequest};

/// Summary of one activation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeReport {
    /// Static assets fetched and cached
    pub cached: usize,
    /// Static assets that could not be fetched (left for cache-first to
    /// pick up later)
    pub failed: usize,
    /// Entries retired from previous generations
    pub purged: u64,
}

/// Primes and activates the current cache generation
pub struct GenerationManager {
    cache: Arc<dyn IResponseCache>,
    fetcher: Arc<dyn IHttpFetcher>,
    generation: GenerationTag,
    app_origin: Url,
    static_assets: Vec<String>,
}

impl GenerationManager {
    /// Builds a manager from the validated configuration
    pub fn new(
        config: &RouterConfig,
        cache: Arc<dyn IResponseCache>,
        fetcher: Arc<dyn IHttpFetcher>,
    ) -> anyhow::Result<Self> {
        let generation =
            GenerationTag::new(config.generation.clone()).context("Invalid generation tag")?;
        let app_origin = Url::parse(&config.app_origin).context("Invalid app origin")?;

        Ok(Self {
            cache,
            fetcher,
            generation,
            app_origin,
            static_assets: config.static_assets.clone(),
        })
    }

    /// The generation this manager installs
    pub fn generation(&self) -> &GenerationTag {
        &self.generation
    }

    /// Primes the static allow-list, then retires stale generations
    ///
    /// Idempotent: re-activating the current generation re-primes the same
    /// keys and retires nothing further. Entries with unparseable or
    /// foreign tags are always retired (fail-safe toward eviction).
    /// Returns only after the purge completes — the hard barrier before
    /// the router serves traffic under the new generation.
    pub async fn activate(&self) -> anyhow::Result<PrimeReport> {
        info!(generation = %self.generation, "Activating cache generation");

        let mut cached = 0usize;
        let mut failed = 0usize;

        for path in &self.static_assets {
            let url = match self.app_origin.join(path) {
                Ok(url) => url,
                Err(e) => {
                    warn!(path = %path, error = %e, "Skipping unresolvable static asset");
                    failed += 1;
                    continue;
                }
            };
            let request = OutboundRequest::get(url);

            match self.fetcher.fetch(&request).await {
                Ok(fetched) if fetched.is_success() => {
                    let entry = CachedResponse {
                        key: request.cache_key(),
                        partition: CachePartition::Static,
                        generation: self.generation.clone(),
                        status: fetched.status,
                        content_type: fetched.content_type,
                        headers: fetched.headers,
                        body: fetched.body,
                        inserted_at: Utc::now(),
                    };
                    match self.cache.put(&entry).await {
                        Ok(()) => {
                            debug!(path = %path, "Primed static asset");
                            cached += 1;
                        }
                        Err(e) => {
                            warn!(path = %path, error = %e, "Failed to cache static asset");
                            failed += 1;
                        }
                    }
                }
                Ok(fetched) => {
                    warn!(path = %path, status = fetched.status, "Static asset fetch not successful");
                    failed += 1;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Static asset fetch failed");
                    failed += 1;
                }
            }
        }

        let purged = self
            .cache
            .purge_generations_except(&self.generation)
            .await
            .context("Failed to retire stale cache generations")?;

        info!(
            generation = %self.generation,
            cached,
            failed,
            purged,
            "Cache generation active"
        );

        Ok(PrimeReport {
            cached,
            failed,
            purged,
        })
    }
}
