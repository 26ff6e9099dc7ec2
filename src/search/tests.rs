use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};

use super::*;
use crate::auth::AuthError;
use crate::embedding::{EmbedderConfig, ImageEmbedder, LazyEmbedder};
use crate::query::QueryError;
use crate::ranking::{Advisory, SearchOutcome};
use crate::registry::{MockRegistry, RegistryError};
use crate::scoring::ScoreWeights;

const WORD: &str = "markFeature==WORD";
const FIGURATIVE: &str = "markFeature!=WORD";
const ANY: &str = "verbalElement==";

fn horizontal_gradient() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 64, |x, _| {
        let v = (x * 4) as u8;
        Rgb([v, v, v])
    });
    encode_png(img)
}

fn vertical_gradient() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 64, |_, y| {
        let v = (y * 4) as u8;
        Rgb([v, v, v])
    });
    encode_png(img)
}

fn encode_png(img: RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn mark(id: &str, name: &str, feature: &str) -> Value {
    json!({
        "applicationNumber": id,
        "wordMarkSpecification": { "verbalElement": name },
        "niceClasses": [25],
        "markFeature": feature,
    })
}

fn mark_with_image(id: &str, name: &str, png: &[u8]) -> Value {
    let mut record = mark(id, name, "FIGURATIVE");
    record["markImage"] = json!({ "content": STANDARD.encode(png), "contentType": "image/png" });
    record
}

fn page(items: Vec<Value>) -> Value {
    json!({ "trademarks": items })
}

fn stub_embedder() -> Arc<LazyEmbedder> {
    Arc::new(LazyEmbedder::preloaded(ImageEmbedder::stub()))
}

fn engine(registry: &Arc<MockRegistry>) -> SearchEngine<MockRegistry> {
    engine_with(registry, SearchSettings::default())
}

fn engine_with(registry: &Arc<MockRegistry>, settings: SearchSettings) -> SearchEngine<MockRegistry> {
    SearchEngine::new(Arc::clone(registry), stub_embedder(), settings)
}

fn ranked(outcome: &SearchOutcome) -> &[crate::ranking::RankedResult] {
    assert!(!outcome.is_no_match(), "expected ranked results, got {outcome:?}");
    outcome.results()
}

// --- budget ---

#[test]
fn test_miss_budget_trips_on_consecutive_misses() {
    let budget = MissBudget::new(3);
    assert!(!budget.record_miss());
    assert!(!budget.record_miss());
    budget.record_hit();
    assert!(!budget.record_miss());
    assert!(!budget.record_miss());
    assert!(!budget.is_exhausted());
    assert!(budget.record_miss());
    assert!(budget.is_exhausted());

    // Stays tripped.
    budget.record_hit();
    assert!(budget.is_exhausted());
    assert!(!budget.record_miss());
}

#[test]
fn test_zero_budget_is_exhausted_from_the_start() {
    let budget = MissBudget::new(0);
    assert!(budget.is_exhausted());
    assert_eq!(budget.limit(), 0);
}

// --- errors ---

#[test]
fn test_error_kinds() {
    assert_eq!(SearchError::from(QueryError::EmptyQuery).kind(), "empty_query");
    assert_eq!(SearchError::from(AuthError::Rejected).kind(), "auth");
    let err = SearchError::DeadlineExceeded {
        deadline: Duration::from_secs(1),
    };
    assert_eq!(err.kind(), "deadline_exceeded");
}

// --- text-only searches ---

#[tokio::test]
async fn test_text_only_search_uses_single_stream() {
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(
        ANY,
        page(vec![
            mark("1", "ADIDAS", "WORD"),
            mark("2", "@dida$", "WORD"),
            mark("3", "Adidas Originals", "FIGURATIVE"),
        ]),
    );

    let outcome = engine(&registry)
        .search(SearchRequest::new("Adidas"))
        .await
        .unwrap();

    let results = ranked(&outcome);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "1");
    assert_eq!(results[0].text_similarity, 1.0);
    assert_eq!(results[0].image_similarity, None);
    assert_eq!(results[0].combined_score, results[0].text_similarity);
    assert_eq!(results[0].advisory, None);
    assert_eq!(results[0].nice_classes, vec!["25".to_string()]);

    let calls = registry.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].contains("markFeature"));
}

#[tokio::test]
async fn test_lower_threshold_admits_near_matches() {
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(ANY, page(vec![mark("1", "ADIDAS", "WORD"), mark("2", "@dida$", "WORD")]));
    let engine = engine(&registry);

    let strict = engine.search(SearchRequest::new("Adidas")).await.unwrap();
    let relaxed = engine
        .search(SearchRequest::new("Adidas").with_threshold(0.7))
        .await
        .unwrap();

    assert_eq!(strict.results().len(), 1);
    let results = ranked(&relaxed);
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].id, "2");
    assert!((results[1].text_similarity - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_nothing_above_threshold_yields_one_no_match_marker() {
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(ANY, page(vec![mark("1", "Zebra", "WORD"), mark("2", "Quokka", "WORD")]));

    let outcome = engine(&registry)
        .search(SearchRequest::new("Adidas"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SearchOutcome::NoMatch {
            threshold: 0.85,
            candidates_considered: 2,
        }
    );
}

#[tokio::test]
async fn test_results_are_truncated_to_top_k_best_first() {
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(
        ANY,
        page(vec![
            mark("1", "Adidass", "WORD"),
            mark("2", "Adidas", "WORD"),
            mark("3", "Adidas!", "WORD"),
            mark("4", "Adidase", "WORD"),
        ]),
    );
    let settings = SearchSettings {
        top_k: 2,
        ..SearchSettings::default()
    };

    let outcome = engine_with(&registry, settings)
        .search(SearchRequest::new("Adidas"))
        .await
        .unwrap();

    let results = ranked(&outcome);
    assert_eq!(results.len(), 2);
    // "Adidas!" sanitizes to an exact match, so it ties with "Adidas" on 1.0.
    assert_eq!(results[0].id, "2");
    assert_eq!(results[1].id, "3");
    assert!(results.windows(2).all(|w| w[0].combined_score >= w[1].combined_score));
}

// --- request validation ---

#[tokio::test]
async fn test_empty_query_makes_no_network_call() {
    let registry = Arc::new(MockRegistry::new());

    let err = engine(&registry)
        .search(SearchRequest::new("!!! ***"))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::EmptyQuery));
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_threshold_is_rejected() {
    let registry = Arc::new(MockRegistry::new());

    let err = engine(&registry)
        .search(SearchRequest::new("Adidas").with_threshold(1.5))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "invalid_request");
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn test_deadline_expiry_returns_no_partial_results() {
    let registry = Arc::new(MockRegistry::new().with_search_delay(Duration::from_millis(500)));
    registry.on_search(ANY, page(vec![mark("1", "Adidas", "WORD")]));

    let err = engine(&registry)
        .search(SearchRequest::new("Adidas").with_deadline(Duration::from_millis(20)))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::DeadlineExceeded { deadline } if deadline == Duration::from_millis(20)));
}

// --- logo searches ---

#[tokio::test]
async fn test_logo_search_splits_streams_and_scores_images() {
    let logo = horizontal_gradient();
    let registry = Arc::new(MockRegistry::new());
    registry
        .on_search(WORD, page(vec![mark("W1", "ADIDAS", "WORD")]))
        .on_search(
            FIGURATIVE,
            page(vec![
                mark_with_image("F1", "Adidas", &logo),
                mark_with_image("F2", "Adidas", &vertical_gradient()),
            ]),
        );

    let outcome = engine(&registry)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(logo)))
        .await
        .unwrap();

    let results = ranked(&outcome);
    let logo_match = results.iter().find(|r| r.id == "F1").unwrap();
    let image = logo_match.image_similarity.unwrap();
    assert!((image - 1.0).abs() < 1e-3);
    assert!((logo_match.combined_score - 1.0).abs() < 1e-3);

    // The word mark is scored on its name alone.
    let word = results.iter().find(|r| r.id == "W1").unwrap();
    assert_eq!(word.image_similarity, None);
    assert_eq!(word.combined_score, 1.0);

    // An orthogonal logo drags the combined score below the threshold.
    assert!(results.iter().all(|r| r.id != "F2"));
    assert!(results.iter().all(|r| r.advisory.is_none()));

    let searches = registry.count_calls("search:");
    assert_eq!(searches, 2);
}

#[tokio::test]
async fn test_unresolvable_images_fall_back_to_text_with_advisory() {
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(FIGURATIVE, page(vec![mark("F1", "Adidas", "FIGURATIVE")]));

    let outcome = engine(&registry)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(horizontal_gradient())))
        .await
        .unwrap();

    let results = ranked(&outcome);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].image_similarity, None);
    assert_eq!(results[0].combined_score, results[0].text_similarity);
    assert_eq!(results[0].advisory, Some(Advisory::RegistryImagesUnavailable));
    assert_eq!(registry.count_calls("image:F1"), 2);
}

#[tokio::test]
async fn test_unusable_logo_is_reported_and_search_continues() {
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(ANY, page(vec![mark("1", "Adidas", "FIGURATIVE")]));

    let outcome = engine(&registry)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Base64("logo_b64_here".into())))
        .await
        .unwrap();

    let results = ranked(&outcome);
    assert_eq!(results[0].advisory, Some(Advisory::UserLogoUnusable));
    assert_eq!(registry.count_calls("search:"), 1);
    assert_eq!(registry.count_calls("detail:"), 0);
}

#[tokio::test]
async fn test_base64_logo_is_accepted() {
    let logo = horizontal_gradient();
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(FIGURATIVE, page(vec![mark_with_image("F1", "Adidas", &logo)]));
    let encoded = format!("data:image/png;base64,{}", STANDARD.encode(&logo));

    let outcome = engine(&registry)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Base64(encoded)))
        .await
        .unwrap();

    assert!(ranked(&outcome)[0].image_similarity.is_some());
}

#[tokio::test]
async fn test_embedder_failure_degrades_to_text() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = Arc::new(LazyEmbedder::new(EmbedderConfig::new(dir.path().join("missing"))));
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(FIGURATIVE, page(vec![mark("F1", "Adidas", "FIGURATIVE")]));
    let engine = SearchEngine::new(Arc::clone(&registry), embedder, SearchSettings::default());

    let outcome = engine
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(horizontal_gradient())))
        .await
        .unwrap();

    let results = ranked(&outcome);
    assert_eq!(results[0].advisory, Some(Advisory::EmbedderUnavailable));
    assert_eq!(registry.count_calls("detail:"), 0);
}

#[tokio::test]
async fn test_hopeless_candidates_are_not_resolved() {
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(FIGURATIVE, page(vec![mark("F1", "Zebra", "FIGURATIVE")]));

    let outcome = engine(&registry)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(horizontal_gradient())))
        .await
        .unwrap();

    assert!(outcome.is_no_match());
    assert_eq!(registry.count_calls("detail:"), 0);
    assert_eq!(registry.count_calls("image:"), 0);
}

#[tokio::test]
async fn test_miss_budget_stops_image_attempts() {
    let registry = Arc::new(MockRegistry::new());
    let marks = (1..=5).map(|i| mark(&format!("F{i}"), "Adidas", "FIGURATIVE")).collect();
    registry.on_search(FIGURATIVE, page(marks));
    let settings = SearchSettings {
        image_concurrency: 1,
        max_image_misses: 2,
        ..SearchSettings::default()
    };

    let outcome = engine_with(&registry, settings)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(horizontal_gradient())))
        .await
        .unwrap();

    assert_eq!(outcome.results().len(), 5);
    // Two candidates, thumbnail and full endpoint each.
    assert_eq!(registry.count_calls("image:"), 4);
}

#[tokio::test]
async fn test_image_weights_are_configurable() {
    let logo = horizontal_gradient();
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(FIGURATIVE, page(vec![mark_with_image("F1", "Adidas", &vertical_gradient())]));
    let settings = SearchSettings {
        weights: ScoreWeights::new(0.9, 0.1).unwrap(),
        ..SearchSettings::default()
    };

    let outcome = engine_with(&registry, settings)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(logo)))
        .await
        .unwrap();

    let result = &ranked(&outcome)[0];
    let image = result.image_similarity.unwrap();
    assert!((result.combined_score - (0.9 + 0.1 * image)).abs() < 1e-5);
}

// --- stream failures ---

#[tokio::test]
async fn test_auth_failure_on_any_stream_is_fatal() {
    let registry = Arc::new(MockRegistry::new());
    registry
        .on_search(WORD, page(vec![mark("W1", "Adidas", "WORD")]))
        .fail_search(FIGURATIVE, AuthError::Rejected.into());

    let err = engine(&registry)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(horizontal_gradient())))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Auth(AuthError::Rejected)));
}

#[tokio::test]
async fn test_one_failed_stream_does_not_abort_the_other() {
    let registry = Arc::new(MockRegistry::new());
    registry
        .on_search(WORD, page(vec![mark("W1", "Adidas", "WORD")]))
        .fail_search(
            FIGURATIVE,
            RegistryError::Timeout { operation: "search" }.into(),
        );

    let outcome = engine(&registry)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(horizontal_gradient())))
        .await
        .unwrap();

    assert_eq!(ranked(&outcome)[0].id, "W1");
}

#[tokio::test]
async fn test_registry_failure_on_every_stream_is_fatal() {
    let registry = Arc::new(MockRegistry::new());
    registry.fail_search(
        "verbalElement",
        RegistryError::Status {
            operation: "search",
            status: 503,
            body: "down".into(),
        }
        .into(),
    );

    let err = engine(&registry)
        .search(SearchRequest::new("Adidas").with_logo(UserLogo::Bytes(horizontal_gradient())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "registry");
}
