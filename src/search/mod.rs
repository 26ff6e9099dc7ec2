//! Search orchestration.
//!
//! [`SearchEngine`] ties the pieces together: query building, concurrent candidate
//! fetching, bounded image resolution with a per-search [`MissBudget`], scoring and
//! ranking, all under a per-search deadline.

pub mod budget;
pub mod engine;
pub mod error;
pub mod request;
pub mod settings;

#[cfg(test)]
mod tests;

pub use budget::MissBudget;
pub use engine::SearchEngine;
pub use error::SearchError;
pub use request::{SearchRequest, UserLogo};
pub use settings::SearchSettings;
