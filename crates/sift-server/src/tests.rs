//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sift_core::AIClient;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    create_router_with_ai(ServerConfig::default(), Some(AIClient::mock()))
}

fn setup_test_app_without_ai() -> Router {
    create_router_with_ai(ServerConfig::default(), None)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

// ========== Classification API Tests ==========

#[tokio::test]
async fn test_classify_spot_export() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "headers": ["Date", "Pair", "Executed", "Fee"]
    });

    let response = app.oneshot(post_json("/api/classify", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["source_system"], "binance");
    assert_eq!(json["ledger_type"], "spot");
    assert_eq!(json["decided_by"], "hybrid");
    assert_eq!(json["cached"], false);
}

#[tokio::test]
async fn test_classify_second_call_reports_cached() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "headers": ["Date", "Pair", "Executed", "Fee"]
    });

    let first = app
        .clone()
        .oneshot(post_json("/api/classify", &body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(post_json("/api/classify", &body)).await.unwrap();
    let json = get_body_json(second).await;
    assert_eq!(json["cached"], true);
}

#[tokio::test]
async fn test_classify_empty_headers_is_client_error() {
    let app = setup_test_app();

    let body = serde_json::json!({ "headers": [] });
    let response = app.oneshot(post_json("/api/classify", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "invalid_request");
}

#[tokio::test]
async fn test_classify_unrecognized_without_ai_is_service_unavailable() {
    let app = setup_test_app_without_ai();

    let body = serde_json::json!({ "headers": ["mystery", "columns"] });
    let response = app.oneshot(post_json("/api/classify", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "service_unavailable");
}

// ========== Cache Admin API Tests ==========

#[tokio::test]
async fn test_cache_stats_after_classification() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "headers": ["Date", "Pair", "Executed", "Fee"]
    });
    app.clone()
        .oneshot(post_json("/api/classify", &body))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cache/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["per_strategy"]["classification"], 1);
}

#[tokio::test]
async fn test_cache_clear_by_strategy() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "headers": ["Date", "Pair", "Executed", "Fee"]
    });
    app.clone()
        .oneshot(post_json("/api/classify", &body))
        .await
        .unwrap();

    let clear = serde_json::json!({ "strategy": "classification" });
    let response = app
        .clone()
        .oneshot(post_json("/api/cache/clear", &clear))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["removed"], 1);

    // Next classification recomputes
    let after = app.oneshot(post_json("/api/classify", &body)).await.unwrap();
    let json = get_body_json(after).await;
    assert_eq!(json["cached"], false);
}

#[tokio::test]
async fn test_cache_clear_unknown_strategy_rejected() {
    let app = setup_test_app();

    let clear = serde_json::json!({ "strategy": "nope" });
    let response = app
        .oneshot(post_json("/api/cache/clear", &clear))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "invalid_request");
}

// ========== Insight API Tests ==========

#[tokio::test]
async fn test_daily_digest() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "owner": "alice",
        "day": "2025-06-01",
        "rows": [
            { "Pair": "BTCUSDT", "Side": "BUY" },
            { "Pair": "ETHUSDT", "Side": "SELL" }
        ]
    });

    let response = app.oneshot(post_json("/api/digest", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["trade_count"], 2);
    assert_eq!(json["markets"], serde_json::json!(["BTCUSDT", "ETHUSDT"]));
    assert_eq!(json["model"], "mock");
}

#[tokio::test]
async fn test_report_summary() {
    let app = setup_test_app();

    let body = serde_json::json!({ "period": "2025-06", "volume": 120000 });
    let response = app
        .oneshot(post_json("/api/reports/summary", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json["summary"].as_str().is_some());
}

#[tokio::test]
async fn test_explore_without_ai_is_service_unavailable() {
    let app = setup_test_app_without_ai();

    let body = serde_json::json!({ "question": "what did I trade in June?" });
    let response = app.oneshot(post_json("/api/explore", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ========== Health API Tests ==========

#[tokio::test]
async fn test_health_with_mock_backend() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["ai"]["configured"], true);
    assert_eq!(json["ai"]["healthy"], true);
    assert_eq!(json["ai"]["model"], "mock");
}

#[tokio::test]
async fn test_health_without_backend() {
    let app = setup_test_app_without_ai();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = get_body_json(response).await;
    assert_eq!(json["ai"]["configured"], false);
}
