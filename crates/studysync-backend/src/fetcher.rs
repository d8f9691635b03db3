//! Live-network fetcher for the request router
//!
//! Implements the `IHttpFetcher` port with reqwest. The router owns all
//! caching decisions; this adapter only performs the wire request and
//! normalizes the response shape.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use studysync_core::ports::{FetchedResponse, IHttpFetcher, NetworkFailure, OutboundRequest};

/// Request timeout for router-initiated fetches
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed implementation of the fetch port
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client
    pub fn new() -> Result<Self, NetworkFailure> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| NetworkFailure(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl IHttpFetcher for HttpFetcher {
    async fn fetch(&self, request: &OutboundRequest) -> Result<FetchedResponse, NetworkFailure> {
        debug!(url = %request.url, "Fetching from network");

        let response = self
            .client
            .request(
                request
                    .method
                    .parse()
                    .map_err(|_| NetworkFailure(format!("invalid method {}", request.method)))?,
                request.url.clone(),
            )
            .send()
            .await
            .map_err(|e| NetworkFailure(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| *name != reqwest::header::CONTENT_TYPE)
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkFailure(e.to_string()))?
            .to_vec();

        Ok(FetchedResponse {
            status,
            content_type,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_normalizes_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manifest.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"name":"app"}"#, "application/json")
                    .insert_header("x-served-by", "edge"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = Url::parse(&format!("{}/manifest.json", server.uri())).unwrap();
        let response = fetcher.fetch(&OutboundRequest::get(url)).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        assert_eq!(response.body, br#"{"name":"app"}"#.to_vec());
        assert!(response
            .headers
            .iter()
            .any(|(name, value)| name == "x-served-by" && value == "edge"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let response = fetcher.fetch(&OutboundRequest::get(url)).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_network_failure() {
        let fetcher = HttpFetcher::new().unwrap();
        // Nothing listens on this port.
        let url = Url::parse("http://127.0.0.1:1/x").unwrap();
        let result = fetcher.fetch(&OutboundRequest::get(url)).await;
        assert!(result.is_err());
    }
}
