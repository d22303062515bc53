use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{events, extract, handlers, settings};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status))
        .route("/metrics", get(handlers::metrics))
        // Work queues
        .route("/queues", get(handlers::queue_depths))
        .route("/queues/extract", post(handlers::enqueue_extract))
        .route("/queues/analysis", post(handlers::enqueue_analysis))
        // Batch extraction runs
        .route("/extract/run", post(extract::start_run))
        .route("/extract/run", get(extract::get_run))
        .route("/extract/run", delete(extract::cancel_run))
        // Settings
        .route("/settings", get(settings::get_settings))
        .route("/settings", put(settings::put_settings))
        // Host event feed
        .route("/events", post(events::post_event))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
