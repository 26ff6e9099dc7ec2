//! Image embeddings for logo comparison.
//!
//! - [`ImageEmbedder`] wraps the CLIP ViT-B/32 vision tower (candle) or a stub.
//! - [`LazyEmbedder`] defers loading until the first search that needs it.

pub mod clip;
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
pub mod lazy;


pub use clip::ImageEmbedder;
pub use config::{CLIP_EMBEDDING_DIM, CLIP_IMAGE_SIZE, EmbedderConfig, STUB_EMBEDDING_DIM};
pub use error::EmbeddingError;
pub use lazy::LazyEmbedder;
