//! Token exchange backends.
//!
//! [`ClientCredentialsSource`] performs the OAuth2 client-credentials grant over HTTPS.
//! [`MockTokenSource`] counts exchanges and is used to test the cache.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::credential::Credential;
use super::error::AuthError;
use crate::constants::{DEFAULT_TOKEN_LIFETIME_SECS, MAX_ERROR_BODY_CHARS, MAX_TOKEN_LIFETIME_SECS};
use crate::registry::truncate_body;

#[async_trait]
/// Something that can mint a fresh [`Credential`].
pub trait TokenSource: Send + Sync {
    /// Performs one token exchange. Implementations must not retry.
    async fn exchange(&self) -> Result<Credential, AuthError>;
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    /// Advertised lifetime, defaulted when absent and capped at one day.
    pub(super) fn lifetime(&self) -> Duration {
        let secs = match &self.expires_in {
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        Duration::from_secs(
            secs.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
                .min(MAX_TOKEN_LIFETIME_SECS),
        )
    }
}

/// OAuth2 client-credentials exchange against the registry's authorization server.
pub struct ClientCredentialsSource {
    http: HttpClient,
    auth_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    timeout: Duration,
}

impl std::fmt::Debug for ClientCredentialsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsSource")
            .field("auth_url", &self.auth_url)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientCredentialsSource {
    /// Creates a source from explicit settings.
    pub fn new(
        http: HttpClient,
        auth_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            auth_url: auth_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            timeout,
        }
    }

    /// Builds a source from the registry section of the configuration.
    pub fn from_config(http: HttpClient, config: &crate::registry::RegistryConfig) -> Self {
        Self::new(
            http,
            config.auth_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.scope.clone(),
            config.auth_timeout,
        )
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsSource {
    async fn exchange(&self) -> Result<Credential, AuthError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            warn!("Registry client id/secret not configured");
            return Err(AuthError::MissingCredentials);
        }

        debug!(auth_url = %self.auth_url, "Requesting registry access token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http
            .post(&self.auth_url)
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                body: truncate_body(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let parsed: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| AuthError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        let lifetime = parsed.lifetime();
        let token = parsed
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AuthError::MalformedResponse {
                reason: "missing access_token".to_string(),
            })?;

        info!(
            lifetime_secs = lifetime.as_secs(),
            "Registry access token obtained"
        );
        Ok(Credential::new(token, lifetime))
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTokenSource;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::TokenSource;
    use crate::auth::credential::Credential;
    use crate::auth::error::AuthError;

    /// In-memory token source that counts exchanges.
    ///
    /// Tokens are `token-1`, `token-2`, ... in exchange order.
    #[derive(Clone)]
    pub struct MockTokenSource {
        calls: Arc<AtomicUsize>,
        lifetime: Duration,
        delay: Duration,
        failures: Arc<Mutex<Vec<AuthError>>>,
    }

    impl MockTokenSource {
        /// Creates a source issuing tokens valid for `lifetime`.
        pub fn new(lifetime: Duration) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                lifetime,
                delay: Duration::ZERO,
                failures: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Adds artificial latency to every exchange.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// Queues an error returned by the next exchange.
        pub fn fail_next(&self, err: AuthError) {
            self.failures.lock().push(err);
        }

        /// Number of exchanges performed so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for MockTokenSource {
        async fn exchange(&self) -> Result<Credential, AuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(err) = self.failures.lock().pop() {
                return Err(err);
            }
            Ok(Credential::new(format!("token-{n}"), self.lifetime))
        }
    }
}
