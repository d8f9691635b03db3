//! Port definitions (hexagonal architecture)
//!
//! These traits are the seams between the domain core and the adapter
//! crates. Driven (secondary) ports: [`IDocumentStore`], [`IResponseCache`],
//! [`IHttpFetcher`], [`IBackendGateway`], [`IPlatformBridge`].

pub mod backend_gateway;
pub mod document_store;
pub mod http_fetcher;
pub mod platform;
pub mod response_cache;

pub use backend_gateway::{AiFunction, IBackendGateway, ReplayOutcome};
pub use document_store::IDocumentStore;
pub use http_fetcher::{
    FetchedResponse, IHttpFetcher, NetworkFailure, OutboundRequest, RequestDestination,
};
pub use platform::{Capabilities, IPlatformBridge, StorageEstimate};
pub use response_cache::IResponseCache;
