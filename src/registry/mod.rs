//! Trademark registry access.
//!
//! - [`RegistrySchema`] declares the registry's field names per API version.
//! - [`RegistryClient`] is the authorized HTTPS transport (per-call timeouts, 401 retry).
//! - [`CandidateFetcher`] turns a [`crate::query::SearchQuery`] into candidates.
//!
//! Higher layers depend on the [`RegistryApi`] trait, which [`MockRegistry`] also
//! implements for tests.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod retry;
pub mod schema;

#[cfg(test)]
mod tests;

pub use api::{ImageEndpoint, RawAsset, RegistryApi};
pub use client::RegistryClient;
pub use config::RegistryConfig;
pub use error::{FetchError, RegistryError, truncate_body};
pub use fetcher::{Candidate, CandidateFetcher, CandidateStream, FetchOutcome, parse_candidates};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockRegistry;
pub use retry::RetryPolicy;
pub use schema::RegistrySchema;
