//! Two-state 401 handling for authorized registry calls.

use crate::auth::AuthError;

/// Tracks whether an authorized call has already spent its one token refresh.
///
/// `Fresh` → first 401 → `Refreshed` (invalidate, re-acquire, retry once) → second
/// 401 → [`AuthError::Rejected`]. A new policy is created per logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    #[default]
    Fresh,
    Refreshed,
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::Fresh
    }

    /// Records a 401. Returns `Ok(())` if the caller should refresh and retry.
    pub fn on_unauthorized(&mut self) -> Result<(), AuthError> {
        match self {
            Self::Fresh => {
                *self = Self::Refreshed;
                Ok(())
            }
            Self::Refreshed => Err(AuthError::Rejected),
        }
    }

    pub fn has_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed)
    }
}
