use std::fmt;

use crate::registry::Candidate;
use crate::scoring::ScoreWeights;

/// Why a candidate has no image score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The caller supplied no usable logo.
    NoUserLogo,
    /// Word marks have no image to compare.
    WordMark,
    /// No strategy produced an image.
    Unresolvable,
    /// The per-search miss budget ran out before this candidate.
    MissBudgetExhausted,
    /// Even a perfect image match could not lift the combined score to the threshold.
    CannotReachThreshold,
    /// The embedder failed to load or to embed one of the two images.
    EmbeddingUnavailable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoUserLogo => "no_user_logo",
            Self::WordMark => "word_mark",
            Self::Unresolvable => "unresolvable",
            Self::MissBudgetExhausted => "miss_budget_exhausted",
            Self::CannotReachThreshold => "cannot_reach_threshold",
            Self::EmbeddingUnavailable => "embedding_unavailable",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image half of a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageScore {
    Scored(f32),
    Skipped(SkipReason),
}

impl ImageScore {
    pub fn value(&self) -> Option<f32> {
        match self {
            Self::Scored(v) => Some(*v),
            Self::Skipped(_) => None,
        }
    }
}

/// A candidate with its text, image and combined scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub text_score: f32,
    pub image: ImageScore,
    pub combined_score: f32,
}

impl ScoredCandidate {
    pub fn new(candidate: Candidate, text_score: f32, image: ImageScore, weights: &ScoreWeights) -> Self {
        let combined_score = weights.combine(text_score, image.value());
        Self {
            candidate,
            text_score,
            image,
            combined_score,
        }
    }

    pub fn is_accepted(&self, threshold: f32) -> bool {
        self.combined_score >= threshold
    }
}

/// State of the caller's logo for this search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoStatus {
    NotSupplied,
    /// Supplied but could not be decoded or normalized.
    Unusable,
    /// Usable, but the embedder could not produce a vector for it.
    EmbedderUnavailable,
    Ready,
}

/// Note attached to the first result when logo comparison produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The registry supplied no usable images for the returned marks.
    RegistryImagesUnavailable,
    /// The caller's logo could not be decoded.
    UserLogoUnusable,
    /// The image model is not available.
    EmbedderUnavailable,
    /// Every returned mark is a word mark, so there was no logo to compare.
    NoFigurativeCandidates,
}

impl Advisory {
    pub fn code(&self) -> &'static str {
        match self {
            Self::RegistryImagesUnavailable => "registry_images_unavailable",
            Self::UserLogoUnusable => "user_logo_unusable",
            Self::EmbedderUnavailable => "embedder_unavailable",
            Self::NoFigurativeCandidates => "no_figurative_candidates",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::RegistryImagesUnavailable => {
                "The registry did not provide images for these marks; scores use the name only."
            }
            Self::UserLogoUnusable => {
                "The supplied logo could not be decoded as an image; scores use the name only."
            }
            Self::EmbedderUnavailable => {
                "Logo comparison is currently unavailable; scores use the name only."
            }
            Self::NoFigurativeCandidates => {
                "Only word marks matched, so there were no registry logos to compare."
            }
        }
    }
}

/// One entry of the ranked output.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub id: String,
    pub name: String,
    pub nice_classes: Vec<String>,
    pub text_similarity: f32,
    pub image_similarity: Option<f32>,
    pub combined_score: f32,
    pub advisory: Option<Advisory>,
}

impl From<ScoredCandidate> for RankedResult {
    fn from(scored: ScoredCandidate) -> Self {
        Self {
            image_similarity: scored.image.value(),
            id: scored.candidate.id,
            name: scored.candidate.name,
            nice_classes: scored.candidate.nice_classes.into_iter().collect(),
            text_similarity: scored.text_score,
            combined_score: scored.combined_score,
            advisory: None,
        }
    }
}

/// What a successful search returns.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Ranked(Vec<RankedResult>),
    /// Nothing reached the threshold.
    NoMatch {
        threshold: f32,
        candidates_considered: usize,
    },
}

impl SearchOutcome {
    pub fn results(&self) -> &[RankedResult] {
        match self {
            Self::Ranked(results) => results,
            Self::NoMatch { .. } => &[],
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch { .. })
    }
}
