//! Hosted-backend HTTP client
//!
//! Wraps `reqwest::Client` with authentication headers and endpoint
//! construction for the backend's REST, storage, and function surfaces.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studysync_backend::client::RestClient;
//!
//! # fn example() -> anyhow::Result<()> {
//! let client = RestClient::new("https://project.example.co", Some("anon-key"))?;
//! let url = client.rest_url("questions")?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::BackendError;

/// Request timeout applied to every backend call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the hosted backend
///
/// Knows how to build URLs for the three backend surfaces (REST tables,
/// storage objects, function invocations) and attaches the API key headers
/// the backend expects.
pub struct RestClient {
    /// The underlying HTTP client
    client: Client,
    /// Backend base URL
    base_url: Url,
    /// API key, attached as `apikey` and bearer token when present
    api_key: Option<String>,
}

impl RestClient {
    /// Creates a new client for the given backend base URL
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: Option<impl Into<String>>,
    ) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {e}", base_url.as_ref())))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(BackendError::NetworkError)?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.map(Into::into),
        })
    }

    /// Returns the backend base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the underlying HTTP client
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// URL of a REST table endpoint, e.g. `/rest/v1/questions`
    pub fn rest_url(&self, table: &str) -> Result<Url, BackendError> {
        self.join(&format!("rest/v1/{table}"))
    }

    /// URL of a storage object, e.g. `/storage/v1/object/uploads/a.png`
    pub fn storage_url(&self, path: &str) -> Result<Url, BackendError> {
        self.join(&format!("storage/v1/object/{path}"))
    }

    /// Public URL of an uploaded storage object
    pub fn public_storage_url(&self, path: &str) -> Result<Url, BackendError> {
        self.join(&format!("storage/v1/object/public/{path}"))
    }

    /// URL of a function endpoint, e.g. `/functions/v1/generate-quiz`
    pub fn function_url(&self, name: &str) -> Result<Url, BackendError> {
        self.join(&format!("functions/v1/{name}"))
    }

    /// Attaches the API key headers to a request when configured
    pub fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("apikey", key).bearer_auth(key),
            None => builder,
        }
    }

    fn join(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidUrl(format!("{path}: {e}")))
    }
}
