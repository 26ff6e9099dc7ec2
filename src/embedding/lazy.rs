use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, instrument};

use super::clip::ImageEmbedder;
use super::config::EmbedderConfig;
use super::error::EmbeddingError;
use crate::image::NormalizedImage;

/// Process-wide image embedder, loaded on first use on the blocking pool.
///
/// The load result, success or failure, is kept for the life of the process.
pub struct LazyEmbedder {
    config: EmbedderConfig,
    cell: OnceCell<Result<Arc<ImageEmbedder>, EmbeddingError>>,
}

impl std::fmt::Debug for LazyEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyEmbedder")
            .field("config", &self.config)
            .field("initialized", &self.cell.initialized())
            .finish()
    }
}

impl LazyEmbedder {
    pub fn new(config: EmbedderConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Wraps an already-loaded embedder.
    pub fn preloaded(embedder: ImageEmbedder) -> Self {
        Self {
            config: EmbedderConfig::stub(),
            cell: OnceCell::new_with(Some(Ok(Arc::new(embedder)))),
        }
    }

    /// Returns `true` once a load attempt has finished.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Loads the embedder if needed. Concurrent callers share one load.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<Arc<ImageEmbedder>, EmbeddingError> {
        self.cell
            .get_or_init(|| async {
                let config = self.config.clone();
                info!(stub = config.is_stub(), "Loading image embedder");
                tokio::task::spawn_blocking(move || ImageEmbedder::load(config).map(Arc::new))
                    .await
                    .unwrap_or_else(|e| {
                        Err(EmbeddingError::ModelLoadFailed {
                            reason: format!("loader task failed: {e}"),
                        })
                    })
            })
            .await
            .clone()
    }

    /// Embeds `image` on the blocking pool.
    pub async fn embed(&self, image: NormalizedImage) -> Result<Vec<f32>, EmbeddingError> {
        let embedder = self.get().await?;
        tokio::task::spawn_blocking(move || embedder.embed(&image))
            .await
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("inference task failed: {e}"),
            })?
    }
}
