//! Settings endpoints: read the current mode snapshot, apply a save.

use axum::{extract::State, Json};
use std::sync::Arc;

use libretto_core::{ModeSnapshot, SettingsUpdate};

use crate::state::AppState;

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<ModeSnapshot> {
    Json((*state.resolver.current()).clone())
}

/// Apply a settings save. Side effects (gate resize, trigger and monitor
/// lifecycle) fire only for values that actually changed.
pub async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Json<ModeSnapshot> {
    state.resolver.apply_settings(update);
    Json((*state.resolver.current()).clone())
}
