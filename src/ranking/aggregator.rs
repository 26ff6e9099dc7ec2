use std::cmp::Ordering;

use tracing::debug;

use super::types::{
    Advisory, ImageScore, LogoStatus, RankedResult, ScoredCandidate, SearchOutcome, SkipReason,
};

/// Threshold, sort and truncate scored candidates.
#[derive(Debug, Clone, Copy)]
pub struct RankingAggregator {
    top_k: usize,
}

impl RankingAggregator {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k: top_k.max(1),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Keeps candidates with `combined ≥ threshold`, best first, at most `top_k`.
    ///
    /// Ties break on text score, then id, so output is deterministic.
    pub fn rank(
        &self,
        scored: Vec<ScoredCandidate>,
        threshold: f32,
        logo: LogoStatus,
    ) -> SearchOutcome {
        let considered = scored.len();
        let mut accepted: Vec<ScoredCandidate> = scored
            .into_iter()
            .filter(|s| s.is_accepted(threshold))
            .collect();

        debug!(considered, accepted = accepted.len(), threshold, "Ranking candidates");

        if accepted.is_empty() {
            return SearchOutcome::NoMatch {
                threshold,
                candidates_considered: considered,
            };
        }

        accepted.sort_by(compare_scored);
        accepted.truncate(self.top_k);

        let advisory = advisory_for(logo, &accepted);
        let mut results: Vec<RankedResult> = accepted.into_iter().map(RankedResult::from).collect();

        if let Some(advisory) = advisory
            && let Some(first) = results.first_mut()
        {
            first.advisory = Some(advisory);
        }

        SearchOutcome::Ranked(results)
    }
}

impl Default for RankingAggregator {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_TOP_K)
    }
}

fn compare_scored(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.combined_score
        .total_cmp(&a.combined_score)
        .then_with(|| b.text_score.total_cmp(&a.text_score))
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

/// Picks the advisory from the logo state and, for a usable logo, from why the
/// returned candidates went without an image score.
fn advisory_for(logo: LogoStatus, returned: &[ScoredCandidate]) -> Option<Advisory> {
    let mut skipped = Vec::with_capacity(returned.len());
    for scored in returned {
        match scored.image {
            ImageScore::Scored(_) => return None,
            ImageScore::Skipped(reason) => skipped.push(reason),
        }
    }

    match logo {
        LogoStatus::NotSupplied => None,
        LogoStatus::Unusable => Some(Advisory::UserLogoUnusable),
        LogoStatus::EmbedderUnavailable => Some(Advisory::EmbedderUnavailable),
        LogoStatus::Ready => {
            let any = |wanted: &[SkipReason]| skipped.iter().any(|r| wanted.contains(r));
            if any(&[SkipReason::Unresolvable, SkipReason::MissBudgetExhausted]) {
                Some(Advisory::RegistryImagesUnavailable)
            } else if any(&[SkipReason::EmbeddingUnavailable]) {
                Some(Advisory::EmbedderUnavailable)
            } else {
                Some(Advisory::NoFigurativeCandidates)
            }
        }
    }
}
