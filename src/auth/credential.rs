use std::time::{Duration, Instant};

use crate::constants::MAX_TOKEN_LIFETIME_SECS;

/// A bearer token and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: Instant,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    /// Creates a credential valid for `lifetime` from now, capped at one day.
    pub fn new(token: impl Into<String>, lifetime: Duration) -> Self {
        let lifetime = lifetime.min(Duration::from_secs(MAX_TOKEN_LIFETIME_SECS));
        Self {
            token: token.into(),
            expires_at: Instant::now() + lifetime,
        }
    }

    /// Creates a credential with an explicit expiry instant.
    pub fn with_expiry(token: impl Into<String>, expires_at: Instant) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Returns the raw bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the expiry instant advertised by the token endpoint.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Returns `true` if `now < expires_at - margin`.
    pub fn is_fresh(&self, now: Instant, margin: Duration) -> bool {
        match self.expires_at.checked_sub(margin) {
            Some(deadline) => now < deadline,
            None => false,
        }
    }
}
