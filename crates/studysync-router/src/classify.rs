//! Request classification
//!
//! Sorts every outgoing request into one of five classes. The first
//! matching rule wins; rules are checked in the order listed on
//! [`RequestClass`].

use studysync_core::config::RouterConfig;
use studysync_core::ports::{OutboundRequest, RequestDestination};

/// The routing class of a request, in rule order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Non-GET method or non-HTTP scheme: not intercepted at all
    Passthrough,
    /// App-shell route or manifest: cache-first into the static partition
    StaticAsset,
    /// API endpoint: network-first into the dynamic partition
    Api,
    /// Image or asset by extension: cache-first into the dynamic partition
    Asset,
    /// Everything else: network-first with document fallback
    Default,
}

/// Classifies requests against the configured allow-lists
pub struct RequestClassifier {
    static_assets: Vec<String>,
    api_prefixes: Vec<String>,
    asset_extensions: Vec<String>,
}

impl RequestClassifier {
    /// Builds a classifier from the router configuration
    ///
    /// The backend REST base URL is appended to the API prefixes by the
    /// caller (the agent) so the classifier itself stays config-driven.
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            static_assets: config.static_assets.clone(),
            api_prefixes: config.api_prefixes.clone(),
            asset_extensions: config.asset_extensions.clone(),
        }
    }

    /// Classifies one request; the first matching rule wins
    pub fn classify(&self, request: &OutboundRequest) -> RequestClass {
        if !request.is_get() || !matches!(request.url.scheme(), "http" | "https") {
            return RequestClass::Passthrough;
        }

        let path = request.url.path();

        if self.matches_static(path) {
            return RequestClass::StaticAsset;
        }

        if self.matches_api(request) {
            return RequestClass::Api;
        }

        if request.destination == RequestDestination::Image || self.matches_extension(path) {
            return RequestClass::Asset;
        }

        RequestClass::Default
    }

    /// Whether a path belongs to the static allow-list
    ///
    /// `"/"` matches only the root exactly; every other entry matches
    /// exactly or as a prefix.
    fn matches_static(&self, path: &str) -> bool {
        self.static_assets.iter().any(|entry| {
            if entry == "/" {
                path == "/"
            } else {
                path == entry || path.starts_with(entry.as_str())
            }
        })
    }

    /// Whether the URL falls under a configured API prefix
    ///
    /// Absolute prefixes (the hosted backend's REST base URL) match on the
    /// full URL; path prefixes match the request path.
    fn matches_api(&self, request: &OutboundRequest) -> bool {
        let href = request.url.as_str();
        let path = request.url.path();
        self.api_prefixes.iter().any(|prefix| {
            if prefix.starts_with("http") {
                href.starts_with(prefix.as_str())
            } else {
                path.starts_with(prefix.as_str())
            }
        })
    }

    /// Whether the path ends in a known asset extension
    fn matches_extension(&self, path: &str) -> bool {
        match path.rsplit_once('.') {
            Some((_, ext)) => self
                .asset_extensions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}
