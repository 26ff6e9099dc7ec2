use super::error::ScoringError;
use crate::constants::{DEFAULT_IMAGE_WEIGHT, DEFAULT_TEXT_WEIGHT, WEIGHT_SUM_TOLERANCE};

/// Blend of text and image scores, used only when both exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    text_weight: f32,
    image_weight: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            text_weight: DEFAULT_TEXT_WEIGHT,
            image_weight: DEFAULT_IMAGE_WEIGHT,
        }
    }
}

impl ScoreWeights {
    /// Validates that both weights are non-negative and sum to 1.0.
    pub fn new(text_weight: f32, image_weight: f32) -> Result<Self, ScoringError> {
        let valid = text_weight.is_finite()
            && image_weight.is_finite()
            && text_weight >= 0.0
            && image_weight >= 0.0
            && ((text_weight + image_weight) - 1.0).abs() <= WEIGHT_SUM_TOLERANCE;
        if !valid {
            return Err(ScoringError::InvalidWeights {
                text: text_weight,
                image: image_weight,
            });
        }
        Ok(Self {
            text_weight,
            image_weight,
        })
    }

    pub fn text_weight(&self) -> f32 {
        self.text_weight
    }

    pub fn image_weight(&self) -> f32 {
        self.image_weight
    }

    /// `w_t·text + w_i·image` when an image score exists, otherwise `text`.
    pub fn combine(&self, text: f32, image: Option<f32>) -> f32 {
        match image {
            Some(image) => (self.text_weight * text + self.image_weight * image).clamp(0.0, 1.0),
            None => text,
        }
    }

    /// Highest combined score reachable with a perfect image match.
    pub fn best_case(&self, text: f32) -> f32 {
        self.combine(text, Some(1.0)).max(text)
    }
}
