//! Host platform bridge
//!
//! A headless agent has neither a background-sync scheduler nor a storage
//! estimator; this bridge reports both as absent so the capability probes
//! cache `false` and every dependent code path takes its degraded branch
//! (poll-fallback reconciliation, `Unknown` storage usage).

use studysync_core::ports::{IPlatformBridge, StorageEstimate};

/// Platform bridge for the host process: no optional facilities
pub struct HostPlatformBridge;

#[async_trait::async_trait]
impl IPlatformBridge for HostPlatformBridge {
    fn supports_background_sync(&self) -> bool {
        false
    }

    fn supports_storage_estimate(&self) -> bool {
        false
    }

    async fn register_sync_tag(&self, tag: &str) -> anyhow::Result<()> {
        anyhow::bail!("background sync not available on this platform (tag {tag})")
    }

    async fn storage_estimate(&self) -> anyhow::Result<Option<StorageEstimate>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studysync_core::ports::Capabilities;

    #[test]
    fn test_host_bridge_probes_to_no_capabilities() {
        let caps = Capabilities::probe(&HostPlatformBridge);
        assert!(!caps.background_sync);
        assert!(!caps.storage_estimate);
    }

    #[tokio::test]
    async fn test_estimate_is_absent_not_error() {
        let estimate = HostPlatformBridge.storage_estimate().await.unwrap();
        assert!(estimate.is_none());
    }
}
