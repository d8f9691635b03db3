//! Studysync Router - Request interception and cache strategies
//!
//! Every outgoing GET request the application issues passes through the
//! [`RequestRouter`], which classifies it and satisfies it with one of
//! three disciplines:
//!
//! - **Cache-first** for the application shell and assets: serve the cached
//!   copy when present, otherwise fetch and cache.
//! - **Network-first** for API endpoints: prefer fresh data, fall back to
//!   the cached copy, degrade to a structured offline error.
//! - **Network-first with document fallback** for everything else.
//!
//! The caller never learns whether a response came from cache or network,
//! and never sees an error: every failure path has a defined fallback
//! (cached copy, offline document, placeholder image, or offline JSON).
//!
//! Cache generations are managed by the [`GenerationManager`]: at startup
//! it primes the static allow-list into the `static` partition under the
//! current generation tag and retires every other generation before the
//! router is handed out.

pub mod classify;
pub mod fallback;
pub mod generation;
pub mod router;

pub use classify::{RequestClass, RequestClassifier};
pub use generation::{GenerationManager, PrimeReport};
pub use router::{RequestRouter, ResponseSource, RoutedResponse, RouterDecision};
