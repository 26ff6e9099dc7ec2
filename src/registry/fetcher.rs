//! Bounded candidate retrieval: one search page per stream, no pagination.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::api::RegistryApi;
use super::error::{FetchError, RegistryError};
use super::schema::RegistrySchema;
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::query::{MarkFeatureFilter, SearchQuery};

/// Which search stream produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateStream {
    Word,
    Figurative,
}

impl fmt::Display for CandidateStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word => write!(f, "word"),
            Self::Figurative => write!(f, "figurative"),
        }
    }
}

/// One registry mark, as returned by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub nice_classes: BTreeSet<String>,
    pub mark_feature: Option<String>,
    pub stream: CandidateStream,
    /// The search hit as received, kept for image extraction.
    pub raw_record: Value,
}

impl Candidate {
    /// Only figurative-stream candidates are worth an image lookup.
    pub fn is_figurative(&self) -> bool {
        self.stream == CandidateStream::Figurative
    }
}

/// Result of one search stream. `Empty` is a valid answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Vec<Candidate>),
    Empty,
}

impl FetchOutcome {
    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Self::Found(candidates) => candidates,
            Self::Empty => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Found(candidates) => candidates.len(),
            Self::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Issues word/figurative searches against a [`RegistryApi`].
pub struct CandidateFetcher<R> {
    registry: Arc<R>,
    page_size: u32,
}

impl<R> Clone for CandidateFetcher<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            page_size: self.page_size,
        }
    }
}

impl<R: RegistryApi> CandidateFetcher<R> {
    pub fn new(registry: Arc<R>, page_size: u32) -> Self {
        Self {
            registry,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn schema(&self) -> &RegistrySchema {
        self.registry.schema()
    }

    /// Word marks matching the query name.
    pub async fn fetch_word_candidates(
        &self,
        query: &SearchQuery,
    ) -> Result<FetchOutcome, FetchError> {
        let query = query.with_mark_feature(MarkFeatureFilter::Word, self.registry.schema());
        self.fetch(&query, Some(CandidateStream::Word)).await
    }

    /// Figurative (non-word) marks matching the query name.
    pub async fn fetch_figurative_candidates(
        &self,
        query: &SearchQuery,
    ) -> Result<FetchOutcome, FetchError> {
        let query = query.with_mark_feature(MarkFeatureFilter::NonWord, self.registry.schema());
        self.fetch(&query, Some(CandidateStream::Figurative)).await
    }

    /// All marks regardless of feature; each candidate is tagged from its record.
    pub async fn fetch_any_candidates(
        &self,
        query: &SearchQuery,
    ) -> Result<FetchOutcome, FetchError> {
        let query = query.with_mark_feature(MarkFeatureFilter::Any, self.registry.schema());
        self.fetch(&query, None).await
    }

    #[instrument(skip(self, query), fields(feature = %query.mark_feature()))]
    async fn fetch(
        &self,
        query: &SearchQuery,
        stream: Option<CandidateStream>,
    ) -> Result<FetchOutcome, FetchError> {
        let payload = self.registry.search(query.filter(), self.page_size).await?;
        let candidates = parse_candidates(self.registry.schema(), &payload, stream)?;

        info!(count = candidates.len(), "Registry search completed");
        if candidates.is_empty() {
            Ok(FetchOutcome::Empty)
        } else {
            Ok(FetchOutcome::Found(candidates))
        }
    }
}

/// Maps a search payload through `schema`.
///
/// Items without an id or a non-empty name are skipped; duplicates keep the first hit.
/// With no `stream` hint, each item is classified by its mark feature.
pub fn parse_candidates(
    schema: &RegistrySchema,
    payload: &Value,
    stream: Option<CandidateStream>,
) -> Result<Vec<Candidate>, RegistryError> {
    let Some(object) = payload.as_object() else {
        return Err(RegistryError::Malformed {
            operation: "search",
            reason: "expected a JSON object".to_string(),
        });
    };

    let items = match object.get(schema.results_field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(RegistryError::Malformed {
                operation: "search",
                reason: format!("'{}' is not an array", schema.results_field),
            });
        }
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(items.len());

    for item in items {
        let (Some(id), Some(name)) = (schema.id_of(item), schema.name_of(item)) else {
            debug!("Skipping registry item without id or name");
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }

        let mark_feature = schema.mark_feature_of(item);
        let stream = stream.unwrap_or_else(|| match mark_feature.as_deref() {
            Some(feature) if feature == schema.word_feature_value => CandidateStream::Word,
            Some(_) => CandidateStream::Figurative,
            None => CandidateStream::Word,
        });

        candidates.push(Candidate {
            id,
            name,
            nice_classes: schema.nice_classes_of(item),
            mark_feature,
            stream,
            raw_record: item.clone(),
        });
    }

    Ok(candidates)
}
