//! HTTP fetch port (driven/secondary port)
//!
//! The request router satisfies cache misses through this interface; it is
//! the only place the router touches the live network. The reqwest-based
//! adapter lives in `studysync-backend`.

use std::fmt;

use thiserror::Error;
use url::Url;

use crate::domain::RequestKey;

/// What kind of resource the caller is loading
///
/// Mirrors the destination hint the runtime attaches to each request; the
/// router uses it to pick the right failure fallback (offline document for
/// navigations, placeholder for images).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
    Document,
    Image,
    Script,
    Style,
    Font,
    Other,
}

/// An outgoing request as seen at the interception boundary
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// HTTP method, uppercase
    pub method: String,
    /// Full request URL
    pub url: Url,
    /// Whether this is a page navigation
    pub is_navigation: bool,
    /// Resource destination hint
    pub destination: RequestDestination,
}

impl OutboundRequest {
    /// A plain GET request
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            is_navigation: false,
            destination: RequestDestination::Other,
        }
    }

    /// A page-navigation GET request
    #[must_use]
    pub fn navigation(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            is_navigation: true,
            destination: RequestDestination::Document,
        }
    }

    /// An image-load GET request
    #[must_use]
    pub fn image(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            is_navigation: false,
            destination: RequestDestination::Image,
        }
    }

    /// Whether the method is GET
    #[must_use]
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// The cache identity of this request
    #[must_use]
    pub fn cache_key(&self) -> RequestKey {
        RequestKey::get(&self.url)
    }
}

impl fmt::Display for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response fetched from the live network
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// Whether the status is a success (2xx)
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transient network failure: connection refused, DNS, timeout
///
/// Never surfaced as a crash — the router degrades through its fallback
/// chain and the reconciler retries on the next trigger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Network failure: {0}")]
pub struct NetworkFailure(pub String);

/// Port trait for issuing network requests
#[async_trait::async_trait]
pub trait IHttpFetcher: Send + Sync {
    /// Performs the request against the live network
    ///
    /// A response with a non-success status is still `Ok`; `Err` means the
    /// network itself was unreachable.
    async fn fetch(&self, request: &OutboundRequest) -> Result<FetchedResponse, NetworkFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_destination() {
        let url = Url::parse("https://example.com/dashboard").unwrap();
        assert!(OutboundRequest::navigation(url.clone()).is_navigation);
        assert_eq!(
            OutboundRequest::image(url.clone()).destination,
            RequestDestination::Image
        );
        assert!(OutboundRequest::get(url).is_get());
    }

    #[test]
    fn test_cache_key_uses_full_url() {
        let url = Url::parse("https://example.com/a?b=c").unwrap();
        let req = OutboundRequest::get(url);
        assert_eq!(req.cache_key().as_str(), "GET https://example.com/a?b=c");
    }
}
