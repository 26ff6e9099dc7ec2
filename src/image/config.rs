use crate::config::{ConfigError, env};
use crate::constants::{DEFAULT_IMAGE_CONCURRENCY, DEFAULT_MAX_IMAGE_MISSES, MAX_IMAGE_CONCURRENCY};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Limits on per-search image resolution.
pub struct ImageConfig {
    /// In-flight resolutions per search (1..=16).
    pub concurrency: usize,
    /// Consecutive misses before image fetching stops for the search. `0` disables images.
    pub max_misses: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_IMAGE_CONCURRENCY,
            max_misses: DEFAULT_MAX_IMAGE_MISSES,
        }
    }
}

impl ImageConfig {
    pub const ENV_IMAGE_CONCURRENCY: &'static str = "MARKWATCH_IMAGE_CONCURRENCY";
    pub const ENV_MAX_IMAGE_MISSES: &'static str = "MARKWATCH_MAX_IMAGE_MISSES";

    /// Loads config from environment variables (with defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            concurrency: env::parse_or(Self::ENV_IMAGE_CONCURRENCY, defaults.concurrency)?,
            max_misses: env::parse_or(Self::ENV_MAX_IMAGE_MISSES, defaults.max_misses)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_IMAGE_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_IMAGE_CONCURRENCY,
                value: self.concurrency.to_string(),
                min: "1".to_string(),
                max: MAX_IMAGE_CONCURRENCY.to_string(),
            });
        }
        Ok(())
    }
}
