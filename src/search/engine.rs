use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info, instrument, warn};

use super::budget::MissBudget;
use super::error::SearchError;
use super::request::{SearchRequest, UserLogo};
use super::settings::SearchSettings;
use crate::constants::MIN_LOGO_BYTES;
use crate::embedding::LazyEmbedder;
use crate::image::{ImageResolver, NormalizedImage, decode_user_logo, normalize_blocking};
use crate::query::{MarkFeatureFilter, SearchQuery};
use crate::ranking::{ImageScore, LogoStatus, RankingAggregator, ScoredCandidate, SearchOutcome, SkipReason};
use crate::registry::{Candidate, CandidateFetcher, FetchError, FetchOutcome, RegistryApi};
use crate::scoring::{image_similarity, name_similarity, validate_threshold};

/// Orchestrates one trademark search end to end.
///
/// Word and figurative streams are fetched concurrently with the logo embedding;
/// figurative candidates are then resolved and embedded through a bounded stream.
/// Any failure that is not pipeline-fatal degrades the candidate to a name-only score.
pub struct SearchEngine<R> {
    fetcher: CandidateFetcher<R>,
    resolver: ImageResolver<R>,
    embedder: Arc<LazyEmbedder>,
    aggregator: RankingAggregator,
    settings: SearchSettings,
}

impl<R> std::fmt::Debug for SearchEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("embedder", &self.embedder)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Caller logo after decoding and normalization.
struct PreparedLogo {
    status: LogoStatus,
    image: Option<NormalizedImage>,
}

impl PreparedLogo {
    fn absent() -> Self {
        Self {
            status: LogoStatus::NotSupplied,
            image: None,
        }
    }

    fn unusable() -> Self {
        Self {
            status: LogoStatus::Unusable,
            image: None,
        }
    }
}

impl<R: RegistryApi> SearchEngine<R> {
    pub fn new(registry: Arc<R>, embedder: Arc<LazyEmbedder>, settings: SearchSettings) -> Self {
        Self {
            fetcher: CandidateFetcher::new(Arc::clone(&registry), settings.page_size),
            resolver: ImageResolver::new(registry),
            embedder,
            aggregator: RankingAggregator::new(settings.top_k),
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn embedder(&self) -> &LazyEmbedder {
        &self.embedder
    }

    /// Runs a search under its deadline. Nothing partial is returned on expiry.
    #[instrument(skip(self, request), fields(name = %request.name, nice_class = ?request.nice_class))]
    pub async fn search(&self, request: SearchRequest) -> Result<SearchOutcome, SearchError> {
        let deadline = request.deadline.unwrap_or(self.settings.deadline);
        if deadline.is_zero() {
            return Err(SearchError::InvalidRequest {
                reason: "deadline must be greater than zero".to_string(),
            });
        }
        match tokio::time::timeout(deadline, self.run(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?deadline, "Search deadline exceeded");
                Err(SearchError::DeadlineExceeded { deadline })
            }
        }
    }

    async fn run(&self, request: SearchRequest) -> Result<SearchOutcome, SearchError> {
        let threshold = match request.threshold {
            Some(value) => validate_threshold(value).map_err(|e| SearchError::InvalidRequest {
                reason: e.to_string(),
            })?,
            None => self.settings.default_threshold,
        };

        let query = SearchQuery::build(
            &request.name,
            request.nice_class,
            MarkFeatureFilter::Any,
            self.fetcher.schema(),
        )?;

        let logo = self.prepare_logo(request.user_logo).await;

        let (candidates, logo_status, logo_vector) = match logo.image {
            Some(image) => {
                let (word, figurative, embedded) = tokio::join!(
                    self.fetcher.fetch_word_candidates(&query),
                    self.fetcher.fetch_figurative_candidates(&query),
                    self.embedder.embed(image),
                );
                let candidates = merge_streams(word, figurative)?;
                match embedded {
                    Ok(vector) => (candidates, LogoStatus::Ready, Some(vector)),
                    Err(e) => {
                        warn!(error = %e, "User logo could not be embedded");
                        (candidates, LogoStatus::EmbedderUnavailable, None)
                    }
                }
            }
            None => {
                let candidates = self.fetcher.fetch_any_candidates(&query).await?.into_candidates();
                (candidates, logo.status, None)
            }
        };

        info!(
            candidates = candidates.len(),
            logo = ?logo_status,
            threshold,
            "Scoring candidates"
        );

        let scored = self
            .score(&query, candidates, logo_status, logo_vector.as_deref(), threshold)
            .await;

        Ok(self.aggregator.rank(scored, threshold, logo_status))
    }

    async fn prepare_logo(&self, logo: Option<UserLogo>) -> PreparedLogo {
        let bytes = match logo {
            None => return PreparedLogo::absent(),
            Some(UserLogo::Bytes(bytes)) if bytes.len() < MIN_LOGO_BYTES => {
                debug!(len = bytes.len(), "User logo too short");
                return PreparedLogo::unusable();
            }
            Some(UserLogo::Bytes(bytes)) => bytes,
            Some(UserLogo::Base64(text)) => match decode_user_logo(&text) {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!(error = %e, "User logo could not be decoded");
                    return PreparedLogo::unusable();
                }
            },
        };

        match normalize_blocking(bytes, None).await {
            Ok(image) => PreparedLogo {
                status: LogoStatus::Ready,
                image: Some(image),
            },
            Err(e) => {
                debug!(error = %e, "User logo is not a usable image");
                PreparedLogo::unusable()
            }
        }
    }

    async fn score(
        &self,
        query: &SearchQuery,
        candidates: Vec<Candidate>,
        logo_status: LogoStatus,
        logo_vector: Option<&[f32]>,
        threshold: f32,
    ) -> Vec<ScoredCandidate> {
        let weights = &self.settings.weights;
        let budget = MissBudget::new(self.settings.max_image_misses);

        let tasks = candidates.into_iter().map(|candidate| {
            let budget = &budget;
            async move {
                let text = name_similarity(query.raw_name(), &candidate.name);
                let image = match logo_vector {
                    None if logo_status == LogoStatus::EmbedderUnavailable => {
                        ImageScore::Skipped(SkipReason::EmbeddingUnavailable)
                    }
                    None => ImageScore::Skipped(SkipReason::NoUserLogo),
                    Some(_) if !candidate.is_figurative() => ImageScore::Skipped(SkipReason::WordMark),
                    Some(_) if weights.best_case(text) < threshold => {
                        ImageScore::Skipped(SkipReason::CannotReachThreshold)
                    }
                    Some(logo) => self.image_score(&candidate, logo, budget).await,
                };
                ScoredCandidate::new(candidate, text, image, weights)
            }
        });

        stream::iter(tasks)
            .buffer_unordered(self.settings.image_concurrency.max(1))
            .collect()
            .await
    }

    async fn image_score(&self, candidate: &Candidate, logo: &[f32], budget: &MissBudget) -> ImageScore {
        if budget.is_exhausted() {
            return ImageScore::Skipped(SkipReason::MissBudgetExhausted);
        }

        let Some(image) = self.resolver.resolve(&candidate.id, &candidate.raw_record).await else {
            budget.record_miss();
            return ImageScore::Skipped(SkipReason::Unresolvable);
        };
        budget.record_hit();

        match self.embedder.embed(image).await {
            Ok(vector) => match image_similarity(Some(logo), Some(&vector)) {
                Some(score) => {
                    debug!(id = %candidate.id, score, "Scored candidate image");
                    ImageScore::Scored(score)
                }
                None => ImageScore::Skipped(SkipReason::EmbeddingUnavailable),
            },
            Err(e) => {
                debug!(id = %candidate.id, error = %e, "Candidate image could not be embedded");
                ImageScore::Skipped(SkipReason::EmbeddingUnavailable)
            }
        }
    }
}

/// Joins the two streams. Auth failures are fatal; a registry failure is fatal only
/// when both streams failed.
fn merge_streams(
    word: Result<FetchOutcome, FetchError>,
    figurative: Result<FetchOutcome, FetchError>,
) -> Result<Vec<Candidate>, SearchError> {
    let (word, figurative) = match (word, figurative) {
        (Err(e @ FetchError::Auth(_)), _) | (_, Err(e @ FetchError::Auth(_))) => return Err(e.into()),
        (Err(e), Err(other)) => {
            warn!(error = %other, "Figurative search failed");
            return Err(e.into());
        }
        (Ok(word), Err(e)) => {
            warn!(error = %e, "Figurative search failed; continuing with word marks");
            (word, FetchOutcome::Empty)
        }
        (Err(e), Ok(figurative)) => {
            warn!(error = %e, "Word search failed; continuing with figurative marks");
            (FetchOutcome::Empty, figurative)
        }
        (Ok(word), Ok(figurative)) => (word, figurative),
    };

    let mut candidates = word.into_candidates();
    for candidate in figurative.into_candidates() {
        if candidates.iter().any(|c| c.id == candidate.id) {
            continue;
        }
        candidates.push(candidate);
    }
    Ok(candidates)
}
