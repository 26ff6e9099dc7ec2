use std::time::Duration;

use crate::config::ConfigError;
use crate::config::env;
use crate::constants::{
    DEFAULT_AUTH_TIMEOUT, DEFAULT_DETAIL_TIMEOUT, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_IMAGE_TIMEOUT,
    DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_TIMEOUT,
};

/// Default EUIPO trademark-search endpoint (sandbox).
pub const DEFAULT_REGISTRY_URL: &str =
    "https://api-sandbox.euipo.europa.eu/trademark-search/trademarks";
/// Default EUIPO token endpoint (sandbox).
pub const DEFAULT_AUTH_URL: &str = "https://auth-sandbox.euipo.europa.eu/oidc/accessToken";
/// Default OAuth2 scope.
pub const DEFAULT_SCOPE: &str = "uid";

#[derive(Clone)]
/// Registry endpoints, credentials and per-call timeouts.
pub struct RegistryConfig {
    /// Trademark collection URL; detail is `{base_url}/{id}`.
    pub base_url: String,
    /// OAuth2 token endpoint.
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub auth_timeout: Duration,
    pub search_timeout: Duration,
    pub detail_timeout: Duration,
    pub image_timeout: Duration,
    pub download_timeout: Duration,
    /// Records requested per search stream.
    pub page_size: u32,
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("auth_timeout", &self.auth_timeout)
            .field("search_timeout", &self.search_timeout)
            .field("detail_timeout", &self.detail_timeout)
            .field("image_timeout", &self.image_timeout)
            .field("download_timeout", &self.download_timeout)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            detail_timeout: DEFAULT_DETAIL_TIMEOUT,
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RegistryConfig {
    pub const ENV_REGISTRY_URL: &'static str = "MARKWATCH_REGISTRY_URL";
    pub const ENV_AUTH_URL: &'static str = "MARKWATCH_AUTH_URL";
    pub const ENV_CLIENT_ID: &'static str = "MARKWATCH_CLIENT_ID";
    pub const ENV_CLIENT_SECRET: &'static str = "MARKWATCH_CLIENT_SECRET";
    pub const ENV_SCOPE: &'static str = "MARKWATCH_SCOPE";
    pub const ENV_AUTH_TIMEOUT_SECS: &'static str = "MARKWATCH_AUTH_TIMEOUT_SECS";
    pub const ENV_SEARCH_TIMEOUT_SECS: &'static str = "MARKWATCH_SEARCH_TIMEOUT_SECS";
    pub const ENV_DETAIL_TIMEOUT_SECS: &'static str = "MARKWATCH_DETAIL_TIMEOUT_SECS";
    pub const ENV_IMAGE_TIMEOUT_SECS: &'static str = "MARKWATCH_IMAGE_TIMEOUT_SECS";
    pub const ENV_DOWNLOAD_TIMEOUT_SECS: &'static str = "MARKWATCH_DOWNLOAD_TIMEOUT_SECS";
    pub const ENV_PAGE_SIZE: &'static str = "MARKWATCH_PAGE_SIZE";

    /// Loads config from environment variables (with defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            base_url: env::string_or(Self::ENV_REGISTRY_URL, &defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            auth_url: env::string_or(Self::ENV_AUTH_URL, &defaults.auth_url),
            client_id: env::string_or(Self::ENV_CLIENT_ID, ""),
            client_secret: env::string_or(Self::ENV_CLIENT_SECRET, ""),
            scope: env::string_or(Self::ENV_SCOPE, &defaults.scope),
            auth_timeout: env::secs_or(Self::ENV_AUTH_TIMEOUT_SECS, defaults.auth_timeout)?,
            search_timeout: env::secs_or(Self::ENV_SEARCH_TIMEOUT_SECS, defaults.search_timeout)?,
            detail_timeout: env::secs_or(Self::ENV_DETAIL_TIMEOUT_SECS, defaults.detail_timeout)?,
            image_timeout: env::secs_or(Self::ENV_IMAGE_TIMEOUT_SECS, defaults.image_timeout)?,
            download_timeout: env::secs_or(
                Self::ENV_DOWNLOAD_TIMEOUT_SECS,
                defaults.download_timeout,
            )?,
            page_size: env::parse_or(Self::ENV_PAGE_SIZE, defaults.page_size)?,
        })
    }

    /// Points both endpoints at a local server; used by HTTP-level tests.
    pub fn for_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            base_url: format!("{base}/trademarks"),
            auth_url: format!("{base}/oidc/accessToken"),
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            ..Default::default()
        }
    }

    /// Checks URLs, page size and timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (Self::ENV_REGISTRY_URL, &self.base_url),
            (Self::ENV_AUTH_URL, &self.auth_url),
        ] {
            let lower = value.to_ascii_lowercase();
            if !(lower.starts_with("https://") || lower.starts_with("http://")) {
                return Err(ConfigError::InvalidUrl {
                    name,
                    value: value.clone(),
                });
            }
        }

        if self.page_size == 0 || self.page_size > 1000 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_PAGE_SIZE,
                value: self.page_size.to_string(),
                min: "1".to_string(),
                max: "1000".to_string(),
            });
        }

        for (name, timeout) in [
            (Self::ENV_AUTH_TIMEOUT_SECS, self.auth_timeout),
            (Self::ENV_SEARCH_TIMEOUT_SECS, self.search_timeout),
            (Self::ENV_DETAIL_TIMEOUT_SECS, self.detail_timeout),
            (Self::ENV_IMAGE_TIMEOUT_SECS, self.image_timeout),
            (Self::ENV_DOWNLOAD_TIMEOUT_SECS, self.download_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::OutOfRange {
                    name,
                    value: "0".to_string(),
                    min: "1".to_string(),
                    max: u64::MAX.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Returns `true` if both client id and secret are set.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}
