use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("image embedding model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load image embedding model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("image embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("image could not be prepared for embedding: {reason}")]
    InvalidImage { reason: String },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
