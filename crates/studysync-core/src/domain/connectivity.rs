//! Connectivity and lifecycle state
//!
//! Process-wide state derived from the runtime's connectivity signal.
//! None of this is persisted; it is rebuilt on every process start.

use chrono::{DateTime, Utc};

/// Network reachability as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl ConnectivityState {
    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectivityState::Online)
    }
}

/// Lifecycle of the offline layer within one process
///
/// `Initializing` covers store open and static-cache priming; the state
/// becomes `Ready` once both complete and only connectivity flips after
/// that. There is no explicit terminal state beyond process shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Initializing,
    Ready(ConnectivityState),
}

impl LifecycleState {
    /// Whether initialization has completed
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, LifecycleState::Ready(_))
    }

    /// Connectivity, if known yet
    #[must_use]
    pub fn connectivity(&self) -> Option<ConnectivityState> {
        match self {
            LifecycleState::Initializing => None,
            LifecycleState::Ready(c) => Some(*c),
        }
    }
}

/// A captured install prompt, held until the user acts on it
///
/// The platform hands this out once; it is owned by the lifecycle monitor
/// and consumed by a single install action.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallPrompt {
    /// When the prompt was captured
    pub captured_at: DateTime<Utc>,
    /// Platform hint supplied with the prompt (e.g. "web", "android")
    pub platform: String,
}

impl InstallPrompt {
    #[must_use]
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            captured_at: Utc::now(),
            platform: platform.into(),
        }
    }
}

/// External events translated into lifecycle transitions
///
/// The monitor subscribes to a single channel of these at startup rather
/// than installing scattered callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// The runtime reports the network is reachable
    Online,
    /// The runtime reports the network is unreachable
    Offline,
    /// The platform captured an install prompt
    InstallPromptAvailable(InstallPrompt),
}

/// Storage-quota usage as reported by the platform's estimate facility
///
/// `Unknown` when the facility is absent; its absence is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageUsage {
    Known { used: u64, available: u64 },
    Unknown,
}
