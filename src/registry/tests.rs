use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::auth::AuthError;
use crate::query::{MarkFeatureFilter, SearchQuery};

fn record(id: serde_json::Value, name: &str, feature: &str) -> serde_json::Value {
    json!({
        "applicationNumber": id,
        "wordMarkSpecification": { "verbalElement": name },
        "niceClasses": [25, "35"],
        "markFeature": feature,
    })
}

#[test]
fn test_truncate_body_respects_char_boundaries() {
    assert_eq!(truncate_body("short", 10), "short");
    assert_eq!(truncate_body("abcdef", 3), "abc...");
    assert_eq!(truncate_body("ééééé", 2), "éé...");
    let long = "x".repeat(2000);
    assert_eq!(truncate_body(&long, 512).chars().count(), 515);
}

#[test]
fn test_retry_policy_allows_exactly_one_refresh() {
    let mut policy = RetryPolicy::new();
    assert!(!policy.has_refreshed());
    assert!(policy.on_unauthorized().is_ok());
    assert!(policy.has_refreshed());
    assert!(matches!(policy.on_unauthorized(), Err(AuthError::Rejected)));
}

#[test]
fn test_schema_reads_string_and_numeric_ids() {
    let schema = RegistrySchema::EUIPO_V1;
    assert_eq!(
        schema.id_of(&json!({"applicationNumber": "018000001"})),
        Some("018000001".to_string())
    );
    assert_eq!(
        schema.id_of(&json!({"applicationNumber": 18000001})),
        Some("18000001".to_string())
    );
    assert_eq!(schema.id_of(&json!({"applicationNumber": "  "})), None);
    assert_eq!(schema.id_of(&json!({})), None);
}

#[test]
fn test_schema_reads_nested_name_and_classes() {
    let schema = RegistrySchema::EUIPO_V1;
    let item = record(json!("1"), " Adidas ", "figurative");
    assert_eq!(schema.name_of(&item), Some("Adidas".to_string()));
    assert_eq!(schema.mark_feature_of(&item), Some("FIGURATIVE".to_string()));
    let classes: Vec<_> = schema.nice_classes_of(&item).into_iter().collect();
    assert_eq!(classes, vec!["25".to_string(), "35".to_string()]);
}

#[test]
fn test_parse_candidates_skips_incomplete_and_duplicate_items() {
    let payload = json!({
        "trademarks": [
            record(json!("1"), "Adidas", "WORD"),
            { "applicationNumber": "2" },
            { "wordMarkSpecification": { "verbalElement": "No id" } },
            record(json!("1"), "Adidas again", "WORD"),
            record(json!(3), "Adibas", "FIGURATIVE"),
        ]
    });

    let candidates =
        parse_candidates(&RegistrySchema::EUIPO_V1, &payload, Some(CandidateStream::Word)).unwrap();

    let ids: Vec<_> = candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(candidates[0].name, "Adidas");
    assert!(candidates.iter().all(|c| c.stream == CandidateStream::Word));
}

#[test]
fn test_parse_candidates_classifies_without_hint() {
    let payload = json!({
        "trademarks": [
            record(json!("1"), "Word mark", "WORD"),
            record(json!("2"), "Logo mark", "FIGURATIVE"),
        ]
    });

    let candidates = parse_candidates(&RegistrySchema::EUIPO_V1, &payload, None).unwrap();
    assert_eq!(candidates[0].stream, CandidateStream::Word);
    assert_eq!(candidates[1].stream, CandidateStream::Figurative);
    assert!(candidates[1].is_figurative());
}

#[test]
fn test_parse_candidates_shape_errors() {
    let schema = RegistrySchema::EUIPO_V1;
    assert!(matches!(
        parse_candidates(&schema, &json!([1, 2]), None),
        Err(RegistryError::Malformed { .. })
    ));
    assert!(matches!(
        parse_candidates(&schema, &json!({"trademarks": "nope"}), None),
        Err(RegistryError::Malformed { .. })
    ));
    assert!(
        parse_candidates(&schema, &json!({"total": 0}), None)
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_fetcher_sends_word_and_figurative_filters() {
    let registry = Arc::new(MockRegistry::new());
    registry.on_search(
        "markFeature==WORD",
        json!({ "trademarks": [record(json!("1"), "Adidas", "WORD")] }),
    );
    registry.on_search(
        "markFeature!=WORD",
        json!({ "trademarks": [record(json!("2"), "Adidas logo", "FIGURATIVE")] }),
    );

    let fetcher = CandidateFetcher::new(Arc::clone(&registry), 75);
    let query = SearchQuery::build(
        "Adidas",
        Some(25),
        MarkFeatureFilter::Any,
        &RegistrySchema::EUIPO_V1,
    )
    .unwrap();

    let word = fetcher.fetch_word_candidates(&query).await.unwrap();
    let figurative = fetcher.fetch_figurative_candidates(&query).await.unwrap();

    let word = word.into_candidates();
    let figurative = figurative.into_candidates();
    assert_eq!(word[0].stream, CandidateStream::Word);
    assert_eq!(figurative[0].stream, CandidateStream::Figurative);

    let calls = registry.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].contains("markBasis==EU_TRADEMARK"));
    assert!(calls.iter().all(|c| c.contains("niceClasses==25")));
}

#[tokio::test]
async fn test_fetcher_empty_is_not_an_error() {
    let registry = Arc::new(MockRegistry::new());
    let fetcher = CandidateFetcher::new(registry, 75);
    let query = SearchQuery::build(
        "Nothing",
        None,
        MarkFeatureFilter::Any,
        &RegistrySchema::EUIPO_V1,
    )
    .unwrap();

    let outcome = fetcher.fetch_any_candidates(&query).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Empty);
    assert!(outcome.is_empty());
}

#[tokio::test]
async fn test_fetcher_propagates_registry_errors() {
    let registry = Arc::new(MockRegistry::new());
    registry.fail_search(
        "markFeature==WORD",
        RegistryError::Status {
            operation: "search",
            status: 503,
            body: "unavailable".to_string(),
        }
        .into(),
    );
    let fetcher = CandidateFetcher::new(registry, 75);
    let query = SearchQuery::build(
        "Acme",
        None,
        MarkFeatureFilter::Any,
        &RegistrySchema::EUIPO_V1,
    )
    .unwrap();

    let err = fetcher.fetch_word_candidates(&query).await.unwrap_err();
    assert_eq!(err.kind(), "registry_status");
    assert!(!err.is_auth());

    // The sibling stream is unaffected.
    assert!(fetcher.fetch_figurative_candidates(&query).await.is_ok());
}

#[test]
fn test_fetcher_zero_page_size_falls_back_to_default() {
    let fetcher = CandidateFetcher::new(Arc::new(MockRegistry::new()), 0);
    assert_eq!(fetcher.page_size(), crate::constants::DEFAULT_PAGE_SIZE);
}

#[test]
fn test_registry_config_validation() {
    let config = RegistryConfig::default();
    assert!(config.validate().is_ok());
    assert!(!config.has_credentials());

    let bad_url = RegistryConfig {
        base_url: "ftp://example.com".to_string(),
        ..Default::default()
    };
    assert!(bad_url.validate().is_err());

    let bad_page = RegistryConfig {
        page_size: 0,
        ..Default::default()
    };
    assert!(bad_page.validate().is_err());
}

#[test]
fn test_registry_config_debug_redacts_secret() {
    let config = RegistryConfig {
        client_secret: "super-secret".to_string(),
        ..RegistryConfig::for_base_url("http://127.0.0.1:9")
    };
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("127.0.0.1:9/trademarks"));
}
