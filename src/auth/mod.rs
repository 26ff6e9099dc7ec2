//! Registry authentication: client-credentials tokens with a single-flight cache.
//!
//! [`CredentialCache`] owns the only copy of the current [`Credential`] and is injected
//! into the registry client; nothing else mutates it.

pub mod cache;
pub mod credential;
pub mod error;
pub mod source;


pub use cache::CredentialCache;
pub use credential::Credential;
pub use error::AuthError;
#[cfg(any(test, feature = "mock"))]
pub use source::MockTokenSource;
pub use source::{ClientCredentialsSource, TokenSource};
