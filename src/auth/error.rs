use thiserror::Error;

/// Failures while obtaining or using a registry bearer token.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Client id or secret is not configured; no exchange was attempted.
    #[error("registry client credentials are not configured")]
    MissingCredentials,

    /// The token endpoint could not be reached (connect error, timeout, TLS).
    #[error("token exchange transport failure: {reason}")]
    Transport { reason: String },

    /// The token endpoint answered with a non-2xx status.
    #[error("token exchange rejected with status {status}: {body}")]
    Exchange { status: u16, body: String },

    /// The token endpoint answered 2xx but without a usable token.
    #[error("malformed token response: {reason}")]
    MalformedResponse { reason: String },

    /// The registry rejected a freshly refreshed token.
    #[error("registry rejected the bearer token after a refresh")]
    Rejected,
}

impl AuthError {
    /// Short machine-readable kind, used in error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::Transport { .. } => "auth_transport",
            AuthError::Exchange { .. } => "auth_exchange",
            AuthError::MalformedResponse { .. } => "auth_malformed",
            AuthError::Rejected => "auth_rejected",
        }
    }
}
