//! Host event webhook feeding the catch-up trigger layer.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::debug;

use libretto_core::LibraryEvent;

use crate::state::AppState;

/// Accept one host lifecycle event. Routing is synchronous and
/// non-blocking; the work itself happens on the dispatcher side.
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<LibraryEvent>,
) -> StatusCode {
    debug!("Host event received: {:?}", event);
    state.triggers.handle_event(event);
    StatusCode::ACCEPTED
}
