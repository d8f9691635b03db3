//! Studysync Agent - Background offline-sync service
//!
//! This binary wires the offline layer together and handles:
//! - Durable store open (degrading to online-only when storage is denied)
//! - Cache-generation activation before any traffic is served
//! - Connectivity probing feeding the lifecycle monitor
//! - Reconciliation on reconnect plus a scheduled fallback timer
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! The agent builds the adapters (SQLite store, reqwest fetcher/gateway),
//! runs the generation activation barrier, then spawns three long-lived
//! tasks: the lifecycle monitor consuming platform events, the reconciler
//! waiting for triggers, and the connectivity probe producing events. A
//! `CancellationToken` propagates shutdown to all of them.

mod platform;
mod probe;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use studysync_backend::{HttpFetcher, RestBackendGateway};
use studysync_core::config::Config;
use studysync_core::domain::ConnectivityState;
use studysync_core::ports::{
    IBackendGateway, IDocumentStore, IHttpFetcher, IPlatformBridge, IResponseCache,
    OutboundRequest,
};
use studysync_router::{GenerationManager, RequestRouter, RouterDecision};
use studysync_store::{
    NullDocumentStore, NullResponseCache, SqliteDocumentStore, SqliteResponseCache, StorePool,
};
use studysync_sync::{LifecycleMonitor, Reconciler};

use crate::platform::HostPlatformBridge;
use crate::probe::ConnectivityProbe;

// ============================================================================
// AgentService
// ============================================================================

/// Main agent service that owns configuration and the store adapters
struct AgentService {
    /// Application configuration loaded from YAML
    config: Config,
    /// Document store (SQLite, or a null store in degraded mode)
    documents: Arc<dyn IDocumentStore>,
    /// Response cache (SQLite, or a null cache in degraded mode)
    cache: Arc<dyn IResponseCache>,
    /// False when persistent storage was denied at startup
    offline_store_available: bool,
    /// Token for signalling graceful shutdown to all async tasks
    shutdown: CancellationToken,
}

impl AgentService {
    /// Creates a new AgentService
    ///
    /// Loads configuration and opens the durable store. Storage denial is
    /// not fatal: the agent continues online-only against null stores and
    /// surfaces the degradation through the monitor's status.
    async fn new(shutdown: CancellationToken) -> Result<Self> {
        let config_path = Config::default_path();
        let config = Config::load_or_default(&config_path);
        info!(config_path = %config_path.display(), "Loaded configuration");

        for error in config.validate() {
            warn!(field = %error.field, "Invalid configuration value: {error}");
        }

        let db_path = config.db_path();
        let (documents, cache, offline_store_available): (
            Arc<dyn IDocumentStore>,
            Arc<dyn IResponseCache>,
            bool,
        ) = match StorePool::open(&db_path).await {
            Ok(pool) => (
                Arc::new(SqliteDocumentStore::new(pool.pool().clone())),
                Arc::new(SqliteResponseCache::new(pool.pool().clone())),
                true,
            ),
            Err(e) => {
                warn!(
                    path = %db_path.display(),
                    error = %e,
                    "Persistent storage unavailable; continuing online-only"
                );
                (Arc::new(NullDocumentStore), Arc::new(NullResponseCache), false)
            }
        };

        Ok(Self {
            config,
            documents,
            cache,
            offline_store_available,
            shutdown,
        })
    }

    /// Runs the agent's main loop
    ///
    /// 1. Builds the network adapters
    /// 2. Activates the cache generation (hard barrier before serving)
    /// 3. Marks the lifecycle ready with the probed connectivity
    /// 4. Spawns the monitor, reconciler, and probe tasks
    /// 5. Runs the scheduled-reconciliation fallback until shutdown
    async fn run(&self) -> Result<()> {
        let fetcher: Arc<dyn IHttpFetcher> = Arc::new(
            HttpFetcher::new().map_err(|e| anyhow::anyhow!("HTTP client init failed: {e}"))?,
        );
        let gateway: Arc<dyn IBackendGateway> = Arc::new(
            RestBackendGateway::new(&self.config.backend)
                .context("Failed to construct backend gateway")?,
        );

        // The hosted backend's REST base URL joins the configured API
        // prefixes so its responses land in the dynamic partition.
        let mut router_config = self.config.router.clone();
        router_config.api_prefixes.push(format!(
            "{}/rest/v1/",
            self.config.backend.base_url.trim_end_matches('/')
        ));

        // Prime the shell and retire stale generations. The router is only
        // constructed after this returns: traffic is never served while a
        // previous generation is being deleted.
        let manager = GenerationManager::new(
            &router_config,
            Arc::clone(&self.cache),
            Arc::clone(&fetcher),
        )?;
        let report = manager
            .activate()
            .await
            .context("Cache generation activation failed")?;
        info!(
            generation = %manager.generation(),
            cached = report.cached,
            failed = report.failed,
            purged = report.purged,
            "Cache generation activated"
        );

        let router = RequestRouter::new(
            &router_config,
            Arc::clone(&self.cache),
            Arc::clone(&fetcher),
        )
        .map_err(|e| anyhow::anyhow!("Router construction failed: {e}"))?;

        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&self.documents),
            Arc::clone(&gateway),
        ));
        let bridge: Arc<dyn IPlatformBridge> = Arc::new(HostPlatformBridge);
        let monitor = Arc::new(LifecycleMonitor::new(
            bridge,
            Arc::clone(&reconciler),
            self.offline_store_available,
        ));

        let (events_tx, events_rx) = mpsc::channel(16);
        let probe = ConnectivityProbe::new(
            Arc::clone(&fetcher),
            Url::parse(&self.config.backend.base_url).context("Invalid backend base URL")?,
            Duration::from_secs(self.config.sync.probe_interval),
            events_tx,
        );

        // Leave Initializing with the actual reachability.
        let initial = probe.check_once().await;
        monitor.mark_ready(initial).await;

        self.offline_self_check(&router).await;

        // Long-lived tasks.
        let reconciler_task = {
            let reconciler = Arc::clone(&reconciler);
            let token = self.shutdown.child_token();
            tokio::spawn(async move { reconciler.run(token).await })
        };
        let monitor_task = {
            let monitor = Arc::clone(&monitor);
            let token = self.shutdown.child_token();
            tokio::spawn(async move { monitor.run(events_rx, token).await })
        };
        let probe_task = {
            let token = self.shutdown.child_token();
            tokio::spawn(async move { probe.run(initial, token).await })
        };

        self.poll_loop(&monitor, &reconciler).await;

        let _ = tokio::join!(reconciler_task, monitor_task, probe_task);
        info!("Agent tasks stopped");
        Ok(())
    }

    /// Scheduled-reconciliation fallback
    ///
    /// Connectivity transitions are the primary trigger; this timer only
    /// runs when the platform has no background-sync facility and
    /// `sync.poll_interval` is non-zero, so queued work is retried even if
    /// connectivity never visibly flips.
    async fn poll_loop(&self, monitor: &LifecycleMonitor, reconciler: &Reconciler) {
        let poll_secs = self.config.sync.poll_interval;
        if poll_secs == 0 || monitor.capabilities().background_sync {
            debug!("Scheduled reconciliation disabled");
            self.shutdown.cancelled().await;
            return;
        }

        info!(poll_interval_secs = poll_secs, "Scheduled reconciliation enabled");
        let mut interval = tokio::time::interval(Duration::from_secs(poll_secs));
        // The first tick fires immediately; reconnect already triggered a run.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if monitor.connectivity().await == Some(ConnectivityState::Online) {
                        debug!("Scheduled reconciliation tick");
                        reconciler.trigger();
                    }
                }
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }
    }

    /// Startup self-check: routes the offline fallback document
    ///
    /// Confirms the fallback chain answers navigations before the agent
    /// reports itself ready; the source tells operators whether the shell
    /// was primed or the built-in document is covering.
    async fn offline_self_check(&self, router: &RequestRouter) {
        let Ok(origin) = Url::parse(&self.config.router.app_origin) else {
            return;
        };
        let Ok(url) = origin.join(&self.config.router.offline_document) else {
            return;
        };

        match router.handle(&OutboundRequest::navigation(url)).await {
            RouterDecision::Respond(response) => info!(
                status = response.status,
                source = ?response.source,
                "Offline fallback self-check passed"
            ),
            RouterDecision::Passthrough => {
                warn!("Offline fallback self-check was not intercepted")
            }
        }
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!("Studysync agent starting (studysyncd)");

    let shutdown_token = CancellationToken::new();

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let service = AgentService::new(shutdown_token.clone()).await?;

    let result = service.run().await;

    match &result {
        Ok(()) => info!("Studysync agent shut down gracefully"),
        Err(e) => tracing::error!(error = %e, "Studysync agent exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
