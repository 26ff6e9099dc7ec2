//! Markwatch library crate (used by the server and integration tests).
//!
//! Given a brand name and, optionally, a logo, markwatch queries a trademark registry,
//! gathers candidate marks and ranks them by combined name and logo similarity.
//!
//! # Public API Surface
//!
//! ## Entry Points
//! - [`SearchEngine`], [`SearchRequest`], [`SearchOutcome`] - Running a search
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`gateway::create_router_with_state`] - HTTP surface
//!
//! ## Registry
//! - [`RegistryClient`], [`RegistryConfig`], [`RegistrySchema`] - Authorized transport
//! - [`CredentialCache`] - Bearer token cache with single-flight refresh
//! - [`CandidateFetcher`] - Word and figurative candidate streams
//!
//! ## Images & Scoring
//! - [`ImageResolver`], [`NormalizedImage`] - Candidate image lookup and normalization
//! - [`ImageEmbedder`], [`LazyEmbedder`] - CLIP image embeddings
//! - [`ScoreWeights`], [`name_similarity`], [`image_similarity`] - Similarity scoring
//! - [`RankingAggregator`] - Threshold, sort and truncate
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod auth;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod image;
pub mod query;
pub mod ranking;
pub mod registry;
pub mod scoring;
pub mod search;

#[cfg(any(test, feature = "mock"))]
pub use auth::MockTokenSource;
pub use auth::{AuthError, ClientCredentialsSource, Credential, CredentialCache, TokenSource};
pub use config::{Config, ConfigError};
pub use embedding::{EmbedderConfig, EmbeddingError, ImageEmbedder, LazyEmbedder};
pub use crate::image::{
    DecodeError, ImageConfig, ImageError, ImageResolver, NormalizedImage, decode_any_base64,
    normalize,
};
pub use query::{MarkFeatureFilter, QueryError, SearchQuery, sanitize};
pub use ranking::{
    Advisory, ImageScore, LogoStatus, RankedResult, RankingAggregator, ScoredCandidate,
    SearchOutcome, SkipReason,
};
#[cfg(any(test, feature = "mock"))]
pub use registry::MockRegistry;
pub use registry::{
    Candidate, CandidateFetcher, CandidateStream, FetchError, FetchOutcome, RegistryApi,
    RegistryClient, RegistryConfig, RegistryError, RegistrySchema,
};
pub use scoring::{ScoreWeights, ScoringConfig, ScoringError, image_similarity, name_similarity};
pub use search::{MissBudget, SearchEngine, SearchError, SearchRequest, SearchSettings, UserLogo};
