//! Candidate ranking.
//!
//! Each candidate moves through `fetched → text scored → image scored | image skipped
//! → combined → accepted | rejected`. [`RankingAggregator`] performs the last step.

pub mod aggregator;
pub mod types;


pub use aggregator::RankingAggregator;
pub use types::{
    Advisory, ImageScore, LogoStatus, RankedResult, ScoredCandidate, SearchOutcome, SkipReason,
};
