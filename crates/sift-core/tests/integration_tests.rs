//! End-to-end tests for the classification pipeline against the mock backend

use std::collections::BTreeMap;
use std::sync::Arc;

use sift_core::{
    AIClient, ClassificationRequest, DecidedBy, ExportClassifier, LedgerType, MockBackend,
    RawClassification, ResponseCache, read_export_preview, DEFAULT_PREVIEW_ROWS,
};

fn request(names: &[&str]) -> ClassificationRequest {
    ClassificationRequest {
        headers: names.iter().map(|s| s.to_string()).collect(),
        sample_rows: vec![],
    }
}

#[tokio::test]
async fn classify_binance_spot_export_end_to_end() {
    let csv = "Date(UTC),Pair,Side,Price,Executed,Amount,Fee\n\
               2025-06-01 10:00:00,BTCUSDT,BUY,67000.00,0.5BTC,33500USDT,0.0005BTC\n";
    let request = read_export_preview(csv.as_bytes(), DEFAULT_PREVIEW_ROWS).unwrap();

    let mock = MockBackend::new();
    mock.push_classification(RawClassification {
        source_system: Some("binance".to_string()),
        ledger_type: Some("spot".to_string()),
        confidence: Some(0.75),
        column_mapping: Some(BTreeMap::from([
            ("timestamp".to_string(), "Date(UTC)".to_string()),
            ("market".to_string(), "Pair".to_string()),
            ("side".to_string(), "Side".to_string()),
            ("price".to_string(), "Price".to_string()),
            ("quantity".to_string(), "Executed".to_string()),
            ("fee".to_string(), "Fee".to_string()),
        ])),
    });

    let classifier =
        ExportClassifier::with_ai(Arc::new(ResponseCache::new()), AIClient::Mock(mock));
    let outcome = classifier.classify(&request).await.unwrap();

    // Heuristic pinned the exchange/type; fallback supplied the mapping
    assert_eq!(outcome.result.source_system, "binance");
    assert_eq!(outcome.result.ledger_type, LedgerType::Spot);
    assert_eq!(outcome.result.confidence, 0.85);
    assert_eq!(outcome.result.decided_by, DecidedBy::Hybrid);
    assert_eq!(
        outcome.result.column_mapping.get("market").map(String::as_str),
        Some("Pair")
    );
    assert!(!outcome.cached);
}

#[tokio::test]
async fn classify_derivatives_signature() {
    let classifier =
        ExportClassifier::with_ai(Arc::new(ResponseCache::new()), AIClient::mock());

    let outcome = classifier
        .classify(&request(&["Date", "Realized Profit", "Symbol"]))
        .await
        .unwrap();
    assert_eq!(outcome.result.ledger_type, LedgerType::Derivatives);
    assert_eq!(outcome.result.confidence, 0.90);
    assert_eq!(outcome.result.decided_by, DecidedBy::Hybrid);
}

#[tokio::test]
async fn idempotent_with_cached_flag_on_second_call() {
    let classifier =
        ExportClassifier::with_ai(Arc::new(ResponseCache::new()), AIClient::mock());
    let req = request(&["Date", "Pair", "Executed", "Fee"]);

    let first = classifier.classify(&req).await.unwrap();
    let second = classifier.classify(&req).await.unwrap();

    assert_eq!(first.result, second.result);
    assert!(!first.cached);
    assert!(second.cached);
}

#[tokio::test]
async fn cache_clear_forces_recomputation() {
    let cache = Arc::new(ResponseCache::new());
    let classifier = ExportClassifier::with_ai(cache.clone(), AIClient::mock());
    let req = request(&["Date", "Pair", "Executed", "Fee"]);

    classifier.classify(&req).await.unwrap();
    assert_eq!(cache.clear(None), 1);

    let after_clear = classifier.classify(&req).await.unwrap();
    assert!(!after_clear.cached);
}

#[tokio::test]
async fn failures_are_never_cached_and_retry_next_call() {
    let cache = Arc::new(ResponseCache::new());
    let mock = MockBackend::new();
    // First pipeline invocation: exhaust the attempt budget with failures
    for _ in 0..sift_core::DEFAULT_FALLBACK_ATTEMPTS {
        mock.push_failure("backend down");
    }
    // Next invocation succeeds (mock default reply)
    let classifier = ExportClassifier::with_ai(cache.clone(), AIClient::Mock(mock));
    let req = request(&["mystery", "columns", "price"]);

    let err = classifier.classify(&req).await.unwrap_err();
    assert_eq!(err.kind(), "service_error");
    assert_eq!(cache.stats().total_entries, 0);

    let recovered = classifier.classify(&req).await.unwrap();
    assert!(!recovered.cached);
    assert_eq!(recovered.result.decided_by, DecidedBy::Fallback);
}
