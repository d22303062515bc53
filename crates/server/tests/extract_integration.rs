//! Batch extraction run lifecycle over the API.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tokio::time::sleep;

use common::{fixtures, TestConfig, TestFixture};

/// Poll the run endpoint until the run reports done.
async fn wait_for_run_done(fixture: &TestFixture) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let response = fixture.get("/api/v1/extract/run").await;
            if response.body["done"] == true {
                return response.body;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("run should finish")
}

#[tokio::test]
async fn test_run_lifecycle_completes_with_report() {
    let fixture = TestFixture::new().await;
    fixture.library.set_pending(vec![
        fixtures::media_item("i1"),
        fixtures::media_item("i2"),
        fixtures::media_item("i3"),
    ]);

    let started = fixture.post_empty("/api/v1/extract/run").await;
    assert_eq!(started.status, StatusCode::ACCEPTED);
    assert!(started.body["run_id"].is_string());

    let done = wait_for_run_done(&fixture).await;
    assert_eq!(done["progress"], 100.0);
    assert_eq!(done["report"]["total"], 3);
    assert_eq!(done["report"]["succeeded"], 3);
    assert_eq!(done["report"]["failed"], 0);
    assert_eq!(done["report"]["cancelled"], false);

    assert_eq!(fixture.library.probe_calls().len(), 3);
}

#[tokio::test]
async fn test_empty_catalog_run_reports_immediately() {
    let fixture = TestFixture::new().await;

    fixture.post_empty("/api/v1/extract/run").await;
    let done = wait_for_run_done(&fixture).await;
    assert_eq!(done["report"]["total"], 0);
    assert_eq!(done["progress"], 100.0);
}

#[tokio::test]
async fn test_item_failures_are_contained_in_report() {
    let fixture = TestFixture::new().await;
    fixture.library.set_pending(vec![
        fixtures::media_item("i1"),
        fixtures::media_item("i2"),
    ]);
    fixture.library.fail_probe_for("i1");

    fixture.post_empty("/api/v1/extract/run").await;
    let done = wait_for_run_done(&fixture).await;
    assert_eq!(done["report"]["succeeded"], 1);
    assert_eq!(done["report"]["failed"], 1);
    assert_eq!(done["report"]["cancelled"], false);
}

#[tokio::test]
async fn test_concurrent_run_is_rejected() {
    let fixture = TestFixture::new().await;
    fixture.library.set_pending(vec![fixtures::media_item("i1")]);
    fixture.library.set_probe_delay(Duration::from_millis(300));

    let first = fixture.post_empty("/api/v1/extract/run").await;
    assert_eq!(first.status, StatusCode::ACCEPTED);

    let second = fixture.post_empty("/api/v1/extract/run").await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    wait_for_run_done(&fixture).await;

    // Once drained, a new run is accepted again.
    let third = fixture.post_empty("/api/v1/extract/run").await;
    assert_eq!(third.status, StatusCode::ACCEPTED);
    wait_for_run_done(&fixture).await;
}

#[tokio::test]
async fn test_cancel_run_stops_dispatch() {
    let fixture = TestFixture::new().await;
    fixture.library.set_pending(vec![
        fixtures::media_item("i1"),
        fixtures::media_item("i2"),
        fixtures::media_item("i3"),
    ]);
    fixture.library.set_probe_delay(Duration::from_millis(200));

    fixture.post_empty("/api/v1/extract/run").await;
    sleep(Duration::from_millis(50)).await;

    let cancelled = fixture.delete("/api/v1/extract/run").await;
    assert_eq!(cancelled.status, StatusCode::ACCEPTED);

    let done = wait_for_run_done(&fixture).await;
    assert_eq!(done["report"]["cancelled"], true);
    // Capacity 1: only the first item was dispatched.
    assert_eq!(done["report"]["total"], 3);
    assert_eq!(done["report"]["completed"], 1);
}

#[tokio::test]
async fn test_run_status_without_runs_is_not_found() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/extract/run").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let cancel = fixture.delete("/api/v1/extract/run").await;
    assert_eq!(cancel.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_resize_applies_to_next_run() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .put(
            "/api/v1/settings",
            json!({
                "extract": { "max_concurrent": 4 },
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["max_concurrent"], 4);

    let status = fixture.get("/api/v1/status").await;
    assert_eq!(status.body["gate_capacity"], 4);
}

#[tokio::test]
async fn test_noop_settings_save_has_no_side_effects() {
    let fixture = TestFixture::with_config(TestConfig::default()).await;
    // Bootstrap applies the initial scopes once; saves must add nothing.
    let scope_baseline = fixture.monitor.library_scope_updates();

    // Default settings saved twice: the monitor lifecycle is untouched.
    let update = json!({
        "extract": { "max_concurrent": 1, "lightweight_only": true },
    });
    fixture.put("/api/v1/settings", update.clone()).await;
    fixture.put("/api/v1/settings", update).await;

    assert_eq!(fixture.monitor.start_calls(), 0);
    assert_eq!(fixture.monitor.stop_calls(), 0);
    assert_eq!(fixture.monitor.library_scope_updates(), scope_baseline);

    // Toggling intro-skip fires the lifecycle exactly once.
    fixture
        .put("/api/v1/settings", json!({"intro_skip": {"enabled": true}}))
        .await;
    assert_eq!(fixture.monitor.start_calls(), 1);
}
