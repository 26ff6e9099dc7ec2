use std::time::Duration;

use thiserror::Error;

use crate::auth::AuthError;
use crate::query::QueryError;
use crate::registry::{FetchError, RegistryError};

#[derive(Debug, Clone, Error)]
/// Pipeline-fatal search failures. Everything else degrades to a text-only score.
pub enum SearchError {
    #[error("brand name is empty after removing special characters")]
    EmptyQuery,

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("registry authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("registry unavailable: {0}")]
    Registry(#[from] RegistryError),

    #[error("search did not finish within {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}

impl SearchError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "empty_query",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Auth(_) => "auth",
            Self::Registry(_) => "registry",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
        }
    }
}

impl From<QueryError> for SearchError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::EmptyQuery => Self::EmptyQuery,
        }
    }
}

impl From<FetchError> for SearchError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Auth(e) => Self::Auth(e),
            FetchError::Registry(e) => Self::Registry(e),
        }
    }
}
