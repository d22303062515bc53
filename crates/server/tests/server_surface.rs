//! API surface tests: health, config, status, queues, metrics.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_endpoint_redacts_api_key() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["media_server"]["api_key"], "***");
    assert_eq!(
        response.body["media_server"]["url"],
        "http://localhost:8096"
    );
}

#[tokio::test]
async fn test_enqueue_extract_updates_depths() {
    let fixture = TestFixture::new().await;

    let item = serde_json::to_value(fixtures::lightweight_item("i1")).unwrap();
    let response = fixture.post("/api/v1/queues/extract", item).await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body["depth"], 1);

    let depths = fixture.get("/api/v1/queues").await;
    assert_eq!(depths.body["extract"], 1);
    assert_eq!(depths.body["analysis"], 0);

    let status = fixture.get("/api/v1/status").await;
    assert_eq!(status.body["extract_queue_depth"], 1);
    assert_eq!(status.body["gate_capacity"], 1);
    assert_eq!(status.body["running"], false);
}

#[tokio::test]
async fn test_enqueue_analysis_accepts_episode() {
    let fixture = TestFixture::new().await;

    let item = serde_json::to_value(fixtures::episode_item("e1")).unwrap();
    let response = fixture.post("/api/v1/queues/analysis", item).await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let depths = fixture.get("/api/v1/queues").await;
    assert_eq!(depths.body["analysis"], 1);
}

#[tokio::test]
async fn test_enqueue_rejects_malformed_item() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/queues/extract", json!({"name": "missing id"}))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_metrics_endpoint_exports_gauges() {
    let fixture = TestFixture::new().await;
    let item = serde_json::to_value(fixtures::media_item("i1")).unwrap();
    fixture.post("/api/v1/queues/extract", item).await;

    let response = fixture.get("/api/v1/metrics").await;
    assert_eq!(response.status, StatusCode::OK);
    let text = response.body.as_str().unwrap_or_default().to_string();
    assert!(text.contains("libretto_extract_queue_depth"));
    assert!(text.contains("libretto_gate_capacity"));
}
