use std::time::Duration;

use crate::config::{Config, ConfigError};
use crate::constants::{
    DEFAULT_IMAGE_CONCURRENCY, DEFAULT_MAX_IMAGE_MISSES, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEADLINE,
    DEFAULT_THRESHOLD, DEFAULT_TOP_K,
};
use crate::scoring::ScoreWeights;

/// Engine knobs resolved from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub default_threshold: f32,
    pub top_k: usize,
    pub weights: ScoreWeights,
    pub page_size: u32,
    pub image_concurrency: usize,
    pub max_image_misses: usize,
    pub deadline: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            weights: ScoreWeights::default(),
            page_size: DEFAULT_PAGE_SIZE,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
            max_image_misses: DEFAULT_MAX_IMAGE_MISSES,
            deadline: DEFAULT_SEARCH_DEADLINE,
        }
    }
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            default_threshold: config.scoring.default_threshold,
            top_k: config.scoring.top_k,
            weights: config.scoring.weights()?,
            page_size: config.registry.page_size,
            image_concurrency: config.image.concurrency,
            max_image_misses: config.image.max_misses,
            deadline: config.search_deadline,
        })
    }
}
