//! Wire shapes for `POST /v1/search`.

use serde::{Deserialize, Serialize};

use crate::ranking::{RankedResult, SearchOutcome};
use crate::search::{SearchRequest, UserLogo};

/// Request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchBody {
    pub name: String,
    #[serde(default)]
    pub nice_class: Option<u32>,
    #[serde(default)]
    pub threshold: Option<f32>,
    /// Bare base64 or a data URL.
    #[serde(default)]
    pub user_logo_b64: Option<String>,
}

impl From<SearchBody> for SearchRequest {
    fn from(body: SearchBody) -> Self {
        Self {
            name: body.name,
            nice_class: body.nice_class,
            threshold: body.threshold,
            user_logo: body
                .user_logo_b64
                .filter(|s| !s.trim().is_empty())
                .map(UserLogo::Base64),
            deadline: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdvisoryBody {
    pub code: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResultBody {
    pub id: String,
    pub name: String,
    pub nice_classes: Vec<String>,
    pub text_similarity: f32,
    pub image_similarity: Option<f32>,
    pub combined_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<AdvisoryBody>,
}

impl From<RankedResult> for ResultBody {
    fn from(result: RankedResult) -> Self {
        Self {
            id: result.id,
            name: result.name,
            nice_classes: result.nice_classes,
            text_similarity: round4(result.text_similarity),
            image_similarity: result.image_similarity.map(round4),
            combined_score: round4(result.combined_score),
            advisory: result.advisory.map(|a| AdvisoryBody {
                code: a.code(),
                message: a.message(),
            }),
        }
    }
}

/// Response body; `status` tags the variant.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchResponse {
    Ranked {
        request_id: String,
        results: Vec<ResultBody>,
    },
    NoMatch {
        request_id: String,
        threshold: f32,
        candidates_considered: usize,
        message: String,
    },
}

impl SearchResponse {
    pub fn from_outcome(request_id: String, outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Ranked(results) => Self::Ranked {
                request_id,
                results: results.into_iter().map(ResultBody::from).collect(),
            },
            SearchOutcome::NoMatch {
                threshold,
                candidates_considered,
            } => Self::NoMatch {
                request_id,
                threshold,
                candidates_considered,
                message: format!(
                    "No registered mark reached a similarity of {threshold:.2} \
                     ({candidates_considered} candidates considered)."
                ),
            },
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Ranked { .. } => "ranked",
            Self::NoMatch { .. } => "no_match",
        }
    }
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}
