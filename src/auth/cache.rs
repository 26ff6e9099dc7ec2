use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::credential::Credential;
use super::error::AuthError;
use super::source::TokenSource;
use crate::constants::TOKEN_SAFETY_MARGIN_SECS;

/// Memoizes a registry bearer token and refreshes it single-flight.
///
/// The cached credential sits behind an async mutex that is held across the exchange,
/// so callers racing on an expired token queue up behind one refresh and then read
/// its result instead of issuing their own.
pub struct CredentialCache {
    source: Arc<dyn TokenSource>,
    state: Mutex<Option<Credential>>,
    safety_margin: Duration,
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("safety_margin", &self.safety_margin)
            .finish_non_exhaustive()
    }
}

impl CredentialCache {
    /// Creates an empty cache with the default 60s safety margin.
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self::with_safety_margin(source, Duration::from_secs(TOKEN_SAFETY_MARGIN_SECS))
    }

    /// Creates an empty cache; margins below 60s are raised to 60s.
    pub fn with_safety_margin(source: Arc<dyn TokenSource>, margin: Duration) -> Self {
        Self {
            source,
            state: Mutex::new(None),
            safety_margin: margin.max(Duration::from_secs(TOKEN_SAFETY_MARGIN_SECS)),
        }
    }

    /// Returns the configured safety margin.
    pub fn safety_margin(&self) -> Duration {
        self.safety_margin
    }

    /// Returns a cached credential if still fresh, otherwise exchanges for a new one.
    ///
    /// On failure the cached value is cleared and the error is returned as-is.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> Result<Credential, AuthError> {
        let mut state = self.state.lock().await;

        if let Some(credential) = state.as_ref()
            && credential.is_fresh(Instant::now(), self.safety_margin)
        {
            return Ok(credential.clone());
        }

        debug!("Cached registry token missing or expiring, refreshing");
        *state = None;

        match self.source.exchange().await {
            Ok(credential) => {
                if !credential.is_fresh(Instant::now(), self.safety_margin) {
                    // Still usable once; just never served from cache.
                    warn!("Token endpoint issued a credential shorter than the safety margin");
                    return Ok(credential);
                }
                *state = Some(credential.clone());
                Ok(credential)
            }
            Err(e) => {
                warn!(error = %e, "Registry token exchange failed");
                Err(e)
            }
        }
    }

    /// Drops the cached credential if it is still the one carrying `rejected_token`.
    ///
    /// Returns `true` if something was dropped.
    pub async fn invalidate(&self, rejected_token: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.as_ref() {
            Some(current) if current.token() == rejected_token => {
                debug!("Invalidating rejected registry token");
                *state = None;
                true
            }
            _ => false,
        }
    }

    /// Unconditionally drops the cached credential.
    pub async fn clear(&self) {
        *self.state.lock().await = None;
    }

    /// Returns `true` if a fresh credential is cached.
    pub async fn has_fresh_token(&self) -> bool {
        self.state
            .lock()
            .await
            .as_ref()
            .is_some_and(|c| c.is_fresh(Instant::now(), self.safety_margin))
    }
}
