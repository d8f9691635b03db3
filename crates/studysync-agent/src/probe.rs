//! Connectivity probe
//!
//! The agent has no browser runtime to hand it online/offline events, so
//! it derives them: a periodic lightweight GET against the backend. Any
//! HTTP answer (even an error status) proves the network is reachable;
//! only a transport failure counts as offline. Transitions are pushed
//! onto the platform event channel the lifecycle monitor consumes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use studysync_core::domain::{ConnectivityState, PlatformEvent};
use studysync_core::ports::{IHttpFetcher, OutboundRequest};

/// Periodically checks reachability and reports transitions
pub struct ConnectivityProbe {
    fetcher: Arc<dyn IHttpFetcher>,
    target: Url,
    interval: Duration,
    events: mpsc::Sender<PlatformEvent>,
}

impl ConnectivityProbe {
    /// Creates a probe against `target`, reporting on `events`
    pub fn new(
        fetcher: Arc<dyn IHttpFetcher>,
        target: Url,
        interval: Duration,
        events: mpsc::Sender<PlatformEvent>,
    ) -> Self {
        Self {
            fetcher,
            target,
            interval,
            events,
        }
    }

    /// One reachability check
    pub async fn check_once(&self) -> ConnectivityState {
        let request = OutboundRequest::get(self.target.clone());
        match self.fetcher.fetch(&request).await {
            Ok(_) => ConnectivityState::Online,
            Err(e) => {
                debug!(target = %self.target, error = %e, "Probe failed");
                ConnectivityState::Offline
            }
        }
    }

    /// Probe loop: emits an event on every connectivity transition
    ///
    /// `initial` is the state already reported to the monitor, so the
    /// first tick only emits on an actual change.
    pub async fn run(&self, initial: ConnectivityState, shutdown: CancellationToken) {
        info!(
            target = %self.target,
            interval_secs = self.interval.as_secs(),
            "Connectivity probe started"
        );

        let mut last = initial;
        let mut interval = tokio::time::interval(self.interval);
        interval.tick().await; // the immediate first tick

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let current = self.check_once().await;
                    if current != last {
                        info!(from = ?last, to = ?current, "Connectivity changed");
                        let event = match current {
                            ConnectivityState::Online => PlatformEvent::Online,
                            ConnectivityState::Offline => PlatformEvent::Offline,
                        };
                        if let Err(e) = self.events.send(event).await {
                            warn!(error = %e, "Event channel closed, probe stopping");
                            break;
                        }
                        last = current;
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Connectivity probe shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studysync_core::ports::{FetchedResponse, NetworkFailure};

    struct FixedFetcher(bool);

    #[async_trait::async_trait]
    impl IHttpFetcher for FixedFetcher {
        async fn fetch(
            &self,
            _request: &OutboundRequest,
        ) -> Result<FetchedResponse, NetworkFailure> {
            if self.0 {
                Ok(FetchedResponse {
                    status: 404,
                    content_type: None,
                    headers: Vec::new(),
                    body: Vec::new(),
                })
            } else {
                Err(NetworkFailure("unreachable".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_any_http_answer_counts_as_online() {
        let (tx, _rx) = mpsc::channel(4);
        let probe = ConnectivityProbe::new(
            Arc::new(FixedFetcher(true)),
            Url::parse("https://backend.test/").unwrap(),
            Duration::from_secs(15),
            tx,
        );
        assert_eq!(probe.check_once().await, ConnectivityState::Online);
    }

    #[tokio::test]
    async fn test_transport_failure_counts_as_offline() {
        let (tx, _rx) = mpsc::channel(4);
        let probe = ConnectivityProbe::new(
            Arc::new(FixedFetcher(false)),
            Url::parse("https://backend.test/").unwrap(),
            Duration::from_secs(15),
            tx,
        );
        assert_eq!(probe.check_once().await, ConnectivityState::Offline);
    }
}
