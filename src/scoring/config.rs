use crate::config::{ConfigError, env};
use crate::constants::{DEFAULT_IMAGE_WEIGHT, DEFAULT_TEXT_WEIGHT, DEFAULT_THRESHOLD, DEFAULT_TOP_K};

use super::weights::ScoreWeights;

#[derive(Debug, Clone, PartialEq)]
/// Ranking knobs: blend weights, acceptance threshold and result count.
pub struct ScoringConfig {
    pub text_weight: f32,
    pub image_weight: f32,
    /// Used when a request does not carry its own threshold.
    pub default_threshold: f32,
    pub top_k: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            text_weight: DEFAULT_TEXT_WEIGHT,
            image_weight: DEFAULT_IMAGE_WEIGHT,
            default_threshold: DEFAULT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ScoringConfig {
    pub const ENV_TEXT_WEIGHT: &'static str = "MARKWATCH_TEXT_WEIGHT";
    pub const ENV_IMAGE_WEIGHT: &'static str = "MARKWATCH_IMAGE_WEIGHT";
    pub const ENV_DEFAULT_THRESHOLD: &'static str = "MARKWATCH_DEFAULT_THRESHOLD";
    pub const ENV_TOP_K: &'static str = "MARKWATCH_TOP_K";

    /// Loads config from environment variables (with defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            text_weight: env::parse_or(Self::ENV_TEXT_WEIGHT, defaults.text_weight)?,
            image_weight: env::parse_or(Self::ENV_IMAGE_WEIGHT, defaults.image_weight)?,
            default_threshold: env::parse_or(
                Self::ENV_DEFAULT_THRESHOLD,
                defaults.default_threshold,
            )?,
            top_k: env::parse_or(Self::ENV_TOP_K, defaults.top_k)?,
        })
    }

    /// Validated weights.
    pub fn weights(&self) -> Result<ScoreWeights, ConfigError> {
        ScoreWeights::new(self.text_weight, self.image_weight).map_err(|_| {
            ConfigError::InvalidWeights {
                text: self.text_weight,
                image: self.image_weight,
            }
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights()?;

        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_DEFAULT_THRESHOLD,
                value: self.default_threshold.to_string(),
                min: "0".to_string(),
                max: "1".to_string(),
            });
        }

        if self.top_k == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_TOP_K,
                value: "0".to_string(),
                min: "1".to_string(),
                max: usize::MAX.to_string(),
            });
        }

        Ok(())
    }
}
