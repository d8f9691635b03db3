//! Studysync Backend - Hosted backend HTTP adapters
//!
//! Provides async adapters for:
//! - Replaying queued mutations onto the backend's REST surface
//! - File upload/delete against backend storage
//! - The four AI function endpoints as opaque JSON calls
//! - The plain GET fetcher the request router uses
//!
//! ## Modules
//!
//! - [`client`] - Typed HTTP client wrapper with endpoint construction
//! - [`gateway`] - `IBackendGateway` implementation
//! - [`fetcher`] - `IHttpFetcher` implementation

pub mod client;
pub mod fetcher;
pub mod gateway;

pub use client::RestClient;
pub use fetcher::HttpFetcher;
pub use gateway::RestBackendGateway;

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend base URL or a derived endpoint URL is malformed
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// A queued payload is missing a field the endpoint needs
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The backend answered with a non-success status
    #[error("Backend rejected request: status {status}")]
    Rejected { status: u16 },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
