use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("score weights must be non-negative and sum to 1.0 (text={text}, image={image})")]
    InvalidWeights { text: f32, image: f32 },

    #[error("threshold must be within [0, 1], got {value}")]
    InvalidThreshold { value: f32 },
}
