use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use super::error::ImageError;
use super::extract::{ImageRef, find_image_refs};
use super::normalize::{NormalizedImage, normalize};
use super::payload::decode_any_base64;
use crate::registry::{ImageEndpoint, RawAsset, RegistryApi};

/// Runs [`normalize`] on the blocking pool.
pub async fn normalize_blocking(
    bytes: Vec<u8>,
    content_type: Option<String>,
) -> Result<NormalizedImage, ImageError> {
    tokio::task::spawn_blocking(move || normalize(&bytes, content_type.as_deref()))
        .await
        .map_err(|e| ImageError::Decode {
            reason: format!("normalization task failed: {e}"),
        })?
}

/// Produces a [`NormalizedImage`] for a candidate, trying cheaper strategies first.
///
/// 1. references in the record already fetched by the search;
/// 2. the detail record, first with an image `fields` selection, then unfiltered;
/// 3. the thumbnail endpoint, then the full image endpoint.
///
/// Every failure along the way is logged and swallowed.
pub struct ImageResolver<R> {
    registry: Arc<R>,
}

impl<R> Clone for ImageResolver<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<R: RegistryApi> ImageResolver<R> {
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// Returns the first image any strategy can produce, or `None`.
    #[instrument(skip(self, raw_record))]
    pub async fn resolve(&self, id: &str, raw_record: &Value) -> Option<NormalizedImage> {
        if let Some(img) = self.try_record(id, raw_record).await {
            debug!(strategy = "record", "Resolved candidate image");
            return Some(img);
        }

        let schema = self.registry.schema();
        for fields in [Some(schema.detail_image_fields), None] {
            match self.registry.detail(id, fields).await {
                Ok(detail) => {
                    if let Some(img) = self.try_record(id, &detail).await {
                        debug!(strategy = "detail", filtered = fields.is_some(), "Resolved candidate image");
                        return Some(img);
                    }
                }
                Err(e) => debug!(error = %e, filtered = fields.is_some(), "Detail fetch failed"),
            }
        }

        for endpoint in [ImageEndpoint::Thumbnail, ImageEndpoint::Full] {
            match self.registry.image(id, endpoint).await {
                Ok(asset) => {
                    if let Some(img) = self.try_asset(id, asset).await {
                        debug!(strategy = ?endpoint, "Resolved candidate image");
                        return Some(img);
                    }
                }
                Err(e) => debug!(error = %e, endpoint = ?endpoint, "Image endpoint failed"),
            }
        }

        debug!(error = %ImageError::Unavailable { id: id.to_string() }, "No image strategy succeeded");
        None
    }

    async fn try_record(&self, id: &str, record: &Value) -> Option<NormalizedImage> {
        for image_ref in find_image_refs(self.registry.schema(), record) {
            let asset = match image_ref {
                ImageRef::Inline {
                    payload,
                    content_type,
                } => match decode_any_base64(&payload) {
                    Ok((bytes, mime)) => RawAsset {
                        bytes,
                        content_type: content_type.or(mime),
                    },
                    Err(e) => {
                        debug!(id, error = %e, "Inline image payload is not valid base64");
                        continue;
                    }
                },
                ImageRef::Remote { url } => match self.registry.download(&url).await {
                    Ok(asset) => asset,
                    Err(e) => {
                        debug!(id, url = %url, error = %e, "Image download failed");
                        continue;
                    }
                },
            };

            if let Some(img) = self.try_asset(id, asset).await {
                return Some(img);
            }
        }
        None
    }

    async fn try_asset(&self, id: &str, asset: RawAsset) -> Option<NormalizedImage> {
        match normalize_blocking(asset.bytes, asset.content_type).await {
            Ok(img) => Some(img),
            Err(e) => {
                debug!(id, error = %e, "Image normalization failed");
                None
            }
        }
    }
}
