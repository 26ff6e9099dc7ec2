use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Clone, Error)]
/// Errors returned by registry transport calls.
pub enum RegistryError {
    /// The registry answered with a non-2xx status (other than a handled 401).
    #[error("registry {operation} returned HTTP {status}: {body}")]
    Status {
        /// Operation label (`search`, `detail`, `image`, `download`).
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The payload was not JSON, or not the expected shape.
    #[error("registry {operation} returned a malformed payload: {reason}")]
    Malformed {
        operation: &'static str,
        reason: String,
    },

    /// Connection or protocol failure.
    #[error("registry {operation} transport error: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    /// The per-call timeout elapsed.
    #[error("registry {operation} timed out")]
    Timeout { operation: &'static str },
}

impl RegistryError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "registry_status",
            Self::Malformed { .. } => "registry_malformed",
            Self::Transport { .. } => "registry_transport",
            Self::Timeout { .. } => "registry_timeout",
        }
    }

    /// Maps a reqwest failure onto `Timeout` or `Transport`.
    pub fn from_reqwest(operation: &'static str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { operation }
        } else {
            Self::Transport {
                operation,
                reason: err.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, Error)]
/// Failure of an authorized registry call.
pub enum FetchError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.kind(),
            Self::Registry(e) => e.kind(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Truncates `body` to at most `max_chars` characters, on a char boundary.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
