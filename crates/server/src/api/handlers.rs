use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use libretto_core::{DispatcherStatus, SanitizedConfig, WorkItem};

use crate::metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<DispatcherStatus> {
    Json(state.dispatcher_status())
}

#[derive(Serialize)]
pub struct QueueDepths {
    pub extract: usize,
    pub analysis: usize,
}

pub async fn queue_depths(State(state): State<Arc<AppState>>) -> Json<QueueDepths> {
    Json(QueueDepths {
        extract: state.extract_queue.len(),
        analysis: state.analysis_queue.len(),
    })
}

#[derive(Serialize)]
pub struct EnqueueResponse {
    pub depth: usize,
}

pub async fn enqueue_extract(
    State(state): State<Arc<AppState>>,
    Json(item): Json<WorkItem>,
) -> (StatusCode, Json<EnqueueResponse>) {
    state.extract_queue.push(item);
    (
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            depth: state.extract_queue.len(),
        }),
    )
}

pub async fn enqueue_analysis(
    State(state): State<Arc<AppState>>,
    Json(item): Json<WorkItem>,
) -> (StatusCode, Json<EnqueueResponse>) {
    state.analysis_queue.push(item);
    (
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            depth: state.analysis_queue.len(),
        }),
    )
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    let status = state.dispatcher_status();
    metrics::EXTRACT_QUEUE_DEPTH.set(status.extract_queue_depth as i64);
    metrics::ANALYSIS_QUEUE_DEPTH.set(status.analysis_queue_depth as i64);
    metrics::GATE_CAPACITY.set(status.gate_capacity as i64);
    metrics::GATE_HELD.set(status.gate_held as i64);
    metrics::encode()
}
