use std::future::Future;

use serde_json::Value;

use super::error::FetchError;
use super::schema::RegistrySchema;

/// Which image endpoint to request for a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageEndpoint {
    Thumbnail,
    Full,
}

/// Binary body plus its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl RawAsset {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
        }
    }
}

/// Minimal async interface to the registry used by the fetcher and image resolver.
pub trait RegistryApi: Send + Sync {
    /// Field mapping for this registry.
    fn schema(&self) -> &RegistrySchema;

    /// Runs one search page with an RSQL-style `filter`.
    fn search(
        &self,
        filter: &str,
        size: u32,
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// Fetches one record, optionally restricted to a `fields` sub-selection.
    fn detail(
        &self,
        id: &str,
        fields: Option<&str>,
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// Fetches a mark image from one of the dedicated image endpoints.
    fn image(
        &self,
        id: &str,
        endpoint: ImageEndpoint,
    ) -> impl Future<Output = Result<RawAsset, FetchError>> + Send;

    /// Downloads an image URL found inside a record (unauthenticated).
    fn download(&self, url: &str) -> impl Future<Output = Result<RawAsset, FetchError>> + Send;
}
