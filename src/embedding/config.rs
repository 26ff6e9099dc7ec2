use std::path::PathBuf;

use crate::config::env;
use crate::embedding::error::EmbeddingError;

/// Side length of the square CLIP input.
pub const CLIP_IMAGE_SIZE: usize = 224;

/// Projection dimension of CLIP ViT-B/32.
pub const CLIP_EMBEDDING_DIM: usize = 512;

/// Output dimension of the stub backend (16x16 grayscale).
pub const STUB_EMBEDDING_DIM: usize = 256;

#[derive(Debug, Clone, Default)]
/// Configuration for [`ImageEmbedder`](super::ImageEmbedder).
pub struct EmbedderConfig {
    /// CLIP `model.safetensors`. `None` selects the deterministic stub backend.
    pub model_path: Option<PathBuf>,
    /// Skip GPU probing.
    pub force_cpu: bool,
}

impl EmbedderConfig {
    pub const ENV_MODEL_PATH: &'static str = "MARKWATCH_MODEL_PATH";
    pub const ENV_FORCE_CPU: &'static str = "MARKWATCH_FORCE_CPU";

    /// Loads config from environment variables.
    pub fn from_env() -> Self {
        Self {
            model_path: env::optional_path(Self::ENV_MODEL_PATH),
            force_cpu: env::var(Self::ENV_FORCE_CPU).is_some_and(|v| v != "false" && v != "0"),
        }
    }

    /// Config for a CLIP weights file.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            force_cpu: false,
        }
    }

    /// Config for the stub backend (no model file).
    pub fn stub() -> Self {
        Self::default()
    }

    pub fn is_stub(&self) -> bool {
        self.model_path.is_none()
    }

    /// Checks that a configured model path points at a file.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        let Some(path) = &self.model_path else {
            return Ok(());
        };

        if !path.exists() {
            return Err(EmbeddingError::ModelNotFound { path: path.clone() });
        }
        if !path.is_file() {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!("model path is not a file: {}", path.display()),
            });
        }
        Ok(())
    }
}
