//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `MARKWATCH_*` environment variables.
//! Each subsystem owns its section ([`RegistryConfig`], [`ScoringConfig`],
//! [`ImageConfig`], [`EmbedderConfig`]); [`Config`] assembles them.

pub(crate) mod env;
pub mod error;


pub use error::ConfigError;

use std::net::IpAddr;
use std::time::Duration;

use crate::constants::DEFAULT_SEARCH_DEADLINE;
use crate::embedding::EmbedderConfig;
use crate::image::ImageConfig;
use crate::registry::RegistryConfig;
use crate::scoring::ScoringConfig;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `MARKWATCH_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Registry endpoints, credentials and per-call timeouts.
    pub registry: RegistryConfig,

    /// Score weights, default threshold and top-K.
    pub scoring: ScoringConfig,

    /// Image resolution concurrency and miss budget.
    pub image: ImageConfig,

    /// CLIP weights location.
    pub embedder: EmbedderConfig,

    /// Whole-search deadline when a request does not carry one. Default: 60 s.
    pub search_deadline: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            registry: RegistryConfig::default(),
            scoring: ScoringConfig::default(),
            image: ImageConfig::default(),
            embedder: EmbedderConfig::default(),
            search_deadline: DEFAULT_SEARCH_DEADLINE,
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "MARKWATCH_PORT";
    pub const ENV_BIND_ADDR: &'static str = "MARKWATCH_BIND_ADDR";
    pub const ENV_SEARCH_DEADLINE_SECS: &'static str = "MARKWATCH_SEARCH_DEADLINE_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            registry: RegistryConfig::from_env()?,
            scoring: ScoringConfig::from_env()?,
            image: ImageConfig::from_env()?,
            embedder: EmbedderConfig::from_env(),
            search_deadline: env::secs_or(Self::ENV_SEARCH_DEADLINE_SECS, defaults.search_deadline)?,
        })
    }

    /// Validates every section and the model path (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry.validate()?;
        self.scoring.validate()?;
        self.image.validate()?;

        if self.search_deadline.is_zero() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SEARCH_DEADLINE_SECS,
                value: "0".to_string(),
                min: "1".to_string(),
                max: u64::MAX.to_string(),
            });
        }

        if let Some(ref path) = self.embedder.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Some(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            None => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            None => Ok(default),
        }
    }
}
