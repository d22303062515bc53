//! Batch extraction run endpoints.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use libretto_core::BatchReport;

use crate::metrics;
use crate::state::{ActiveRun, AppState};

#[derive(Serialize)]
pub struct RunStatus {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub progress: f64,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BatchReport>,
}

impl RunStatus {
    fn from_run(run: &ActiveRun) -> Self {
        Self {
            run_id: run.id,
            started_at: run.started_at,
            progress: *run.progress.read().unwrap(),
            done: run.is_done(),
            report: run.report.read().unwrap().clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Start a batch run. One run at a time; a second request while a run is
/// in flight is rejected.
pub async fn start_run(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<RunStatus>), (StatusCode, Json<ErrorResponse>)> {
    let mut active = state.active_run.lock().await;
    if let Some(run) = active.as_ref() {
        if !run.is_done() {
            return Err((
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("run {} is still in flight", run.id),
                }),
            ));
        }
    }

    let cancel = CancellationToken::new();
    let run = Arc::new(ActiveRun::new(cancel.clone()));
    info!("Starting extract run {}", run.id);
    metrics::EXTRACT_RUNS_TOTAL.inc();

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();

    // Progress consumer: keep the latest value readable by the API.
    {
        let run = Arc::clone(&run);
        tokio::spawn(async move {
            while let Some(value) = progress_rx.recv().await {
                *run.progress.write().unwrap() = value;
            }
        });
    }

    // The run itself.
    {
        let run = Arc::clone(&run);
        let dispatcher = Arc::clone(&state.dispatcher);
        tokio::spawn(async move {
            let report = dispatcher.run_batch(cancel, Some(progress_tx)).await;
            if report.cancelled {
                metrics::EXTRACT_RUNS_CANCELLED_TOTAL.inc();
            }
            // The dispatcher's final report is 100; don't let the progress
            // consumer race the done flag.
            *run.progress.write().unwrap() = 100.0;
            *run.report.write().unwrap() = Some(report);
        });
    }

    let status = RunStatus::from_run(&run);
    *active = Some(run);
    Ok((StatusCode::ACCEPTED, Json(status)))
}

/// Status of the most recent run.
pub async fn get_run(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RunStatus>, StatusCode> {
    let active = state.active_run.lock().await;
    match active.as_ref() {
        Some(run) => Ok(Json(RunStatus::from_run(run))),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Request cancellation of the in-flight run. In-flight items finish on
/// their own; progress keeps flowing until the run drains.
pub async fn cancel_run(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, StatusCode> {
    let active = state.active_run.lock().await;
    match active.as_ref() {
        Some(run) if !run.is_done() => {
            info!("Cancelling extract run {}", run.id);
            run.cancel.cancel();
            Ok(StatusCode::ACCEPTED)
        }
        Some(_) => Err(StatusCode::CONFLICT),
        None => Err(StatusCode::NOT_FOUND),
    }
}
