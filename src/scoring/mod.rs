//! Similarity scoring.
//!
//! Text: indel ratio on names, taking the better of the raw and sanitized forms.
//! Image: cosine similarity of logo embeddings, rescaled to [0, 1].
//! Both feed [`ScoreWeights::combine`].

pub mod config;
pub mod error;
pub mod text;
pub mod visual;
pub mod weights;


pub use config::ScoringConfig;
pub use error::ScoringError;
pub use text::{name_similarity, text_similarity};
pub use visual::{cosine_similarity, image_similarity};
pub use weights::ScoreWeights;

/// Checks a caller-supplied threshold.
pub fn validate_threshold(value: f32) -> Result<f32, ScoringError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ScoringError::InvalidThreshold { value })
    }
}
