//! Platform bridge port (driven/secondary port)
//!
//! Optional platform facilities: background-sync registration and storage
//! estimation. Both may be absent; their absence degrades behavior, never
//! correctness. Capability probes run once at startup and are cached as
//! flags — call sites branch on the flags rather than re-probing.

/// Used/available byte counts from the platform's storage-estimate facility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageEstimate {
    pub used: u64,
    pub available: u64,
}

/// Port trait for optional platform facilities
#[async_trait::async_trait]
pub trait IPlatformBridge: Send + Sync {
    /// Whether the platform offers background-sync registration
    fn supports_background_sync(&self) -> bool;

    /// Whether the platform offers storage estimation
    fn supports_storage_estimate(&self) -> bool;

    /// Registers a named sync tag with the platform scheduler (best-effort)
    async fn register_sync_tag(&self, tag: &str) -> anyhow::Result<()>;

    /// Queries storage usage; `Ok(None)` when the facility is unavailable
    async fn storage_estimate(&self) -> anyhow::Result<Option<StorageEstimate>>;
}

/// Capability flags probed once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub background_sync: bool,
    pub storage_estimate: bool,
}

impl Capabilities {
    /// Probe a platform bridge once, caching the results as booleans
    #[must_use]
    pub fn probe(bridge: &dyn IPlatformBridge) -> Self {
        Self {
            background_sync: bridge.supports_background_sync(),
            storage_estimate: bridge.supports_storage_estimate(),
        }
    }

    /// A platform with no optional facilities at all
    #[must_use]
    pub const fn none() -> Self {
        Self {
            background_sync: false,
            storage_estimate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBridge(bool, bool);

    #[async_trait::async_trait]
    impl IPlatformBridge for FixedBridge {
        fn supports_background_sync(&self) -> bool {
            self.0
        }

        fn supports_storage_estimate(&self) -> bool {
            self.1
        }

        async fn register_sync_tag(&self, _tag: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn storage_estimate(&self) -> anyhow::Result<Option<StorageEstimate>> {
            Ok(None)
        }
    }

    #[test]
    fn test_probe_caches_flags() {
        let caps = Capabilities::probe(&FixedBridge(true, false));
        assert!(caps.background_sync);
        assert!(!caps.storage_estimate);
    }

    #[test]
    fn test_none_has_nothing() {
        let caps = Capabilities::none();
        assert!(!caps.background_sync);
        assert!(!caps.storage_estimate);
    }
}
