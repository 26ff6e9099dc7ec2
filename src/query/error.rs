//! Query building error types.

use thiserror::Error;

/// Errors raised while building a [`super::SearchQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The name had no alphanumeric content left after sanitization.
    #[error("brand name is empty after removing special characters")]
    EmptyQuery,
}
