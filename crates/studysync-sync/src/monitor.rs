//! Connectivity & lifecycle monitor
//!
//! Owns the process-wide lifecycle state machine and translates external
//! platform events into explicit transitions. The monitor subscribes to a
//! single event channel at startup; nothing else in the process installs
//! connectivity callbacks.
//!
//! Transitions:
//! - `Initializing → Ready(...)` once the store is open and the static
//!   cache is primed (the agent calls [`LifecycleMonitor::mark_ready`]).
//! - `Ready(Offline) → Ready(Online)` triggers exactly one reconciler run
//!   and re-registers the background-sync tags.
//! - `Ready(Online) → Ready(Offline)` is observational only.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use studysync_core::domain::{
    ConnectivityState, InstallPrompt, LifecycleState, PlatformEvent, StorageUsage,
};
use studysync_core::ports::{Capabilities, IPlatformBridge};

use crate::reconciler::Reconciler;

/// Point-in-time status exposed to the user-facing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Current lifecycle state
    pub lifecycle: LifecycleState,
    /// Whether the platform offers background sync
    pub background_sync: bool,
    /// Storage-quota usage, `Unknown` when the facility is absent
    pub storage: StorageUsage,
    /// Whether the durable store opened; `false` means degraded
    /// online-only mode
    pub offline_store_available: bool,
    /// Whether an install prompt is waiting to be consumed
    pub install_available: bool,
}

/// Process-wide connectivity and lifecycle tracking
pub struct LifecycleMonitor {
    state: RwLock<LifecycleState>,
    bridge: Arc<dyn IPlatformBridge>,
    /// Probed once at construction; call sites branch on these flags
    capabilities: Capabilities,
    /// Captured install prompt, consumed at most once
    install_prompt: Mutex<Option<InstallPrompt>>,
    reconciler: Arc<Reconciler>,
    offline_store_available: bool,
}

impl LifecycleMonitor {
    /// Creates the monitor, probing platform capabilities once
    pub fn new(
        bridge: Arc<dyn IPlatformBridge>,
        reconciler: Arc<Reconciler>,
        offline_store_available: bool,
    ) -> Self {
        let capabilities = Capabilities::probe(bridge.as_ref());
        info!(
            background_sync = capabilities.background_sync,
            storage_estimate = capabilities.storage_estimate,
            offline_store_available,
            "Platform capabilities probed"
        );

        Self {
            state: RwLock::new(LifecycleState::Initializing),
            bridge,
            capabilities,
            install_prompt: Mutex::new(None),
            reconciler,
            offline_store_available,
        }
    }

    /// The capability flags probed at construction
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Completes initialization: store open and static cache primed
    ///
    /// Entering `Ready(Online)` counts as a transition into `Online` and
    /// triggers a reconciliation run for anything left queued from the
    /// previous process lifetime.
    pub async fn mark_ready(&self, initial: ConnectivityState) {
        {
            let mut state = self.state.write().await;
            *state = LifecycleState::Ready(initial);
        }
        info!(connectivity = ?initial, "Lifecycle ready");

        if initial.is_online() {
            self.on_reconnect().await;
        }
    }

    /// Current connectivity, `None` while still initializing
    pub async fn connectivity(&self) -> Option<ConnectivityState> {
        self.state.read().await.connectivity()
    }

    /// Whether an install prompt is available
    pub async fn install_available(&self) -> bool {
        self.install_prompt.lock().await.is_some()
    }

    /// Consumes the captured install prompt (at most once)
    pub async fn take_install_prompt(&self) -> Option<InstallPrompt> {
        self.install_prompt.lock().await.take()
    }

    /// Snapshot of the current status for the user-facing layer
    pub async fn status(&self) -> StatusSnapshot {
        let storage = if self.capabilities.storage_estimate {
            match self.bridge.storage_estimate().await {
                Ok(Some(estimate)) => StorageUsage::Known {
                    used: estimate.used,
                    available: estimate.available,
                },
                // Facility vanished or errored: degrade to unknown.
                _ => StorageUsage::Unknown,
            }
        } else {
            StorageUsage::Unknown
        };

        StatusSnapshot {
            lifecycle: *self.state.read().await,
            background_sync: self.capabilities.background_sync,
            storage,
            offline_store_available: self.offline_store_available,
            install_available: self.install_prompt.lock().await.is_some(),
        }
    }

    /// Applies one platform event to the state machine
    pub async fn handle_event(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::Online => {
                let transitioned = {
                    let mut state = self.state.write().await;
                    match *state {
                        LifecycleState::Ready(ConnectivityState::Online) => false,
                        _ => {
                            *state = LifecycleState::Ready(ConnectivityState::Online);
                            true
                        }
                    }
                };
                if transitioned {
                    info!("Connectivity restored");
                    self.on_reconnect().await;
                } else {
                    debug!("Already online, ignoring duplicate event");
                }
            }
            PlatformEvent::Offline => {
                let mut state = self.state.write().await;
                if *state != LifecycleState::Ready(ConnectivityState::Offline) {
                    *state = LifecycleState::Ready(ConnectivityState::Offline);
                    info!("Connectivity lost, queuing mutations locally");
                }
            }
            PlatformEvent::InstallPromptAvailable(prompt) => {
                debug!(platform = %prompt.platform, "Install prompt captured");
                *self.install_prompt.lock().await = Some(prompt);
            }
        }
    }

    /// Main event loop: consumes the platform event channel until shutdown
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<PlatformEvent>,
        shutdown: CancellationToken,
    ) {
        info!("Lifecycle monitor started");

        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => {
                            info!("Event channel closed, monitor shutting down");
                            break;
                        }
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Lifecycle monitor shutting down");
                    break;
                }
            }
        }
    }

    /// Actions on a transition into `Online`
    async fn on_reconnect(&self) {
        if self.capabilities.background_sync {
            Reconciler::register_background_tags(self.bridge.as_ref()).await;
        }
        self.reconciler.trigger();
    }
}
