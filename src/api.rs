//! Plain HTTP endpoints served next to the WebSocket.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::state::AppState;

/// Liveness check.
///
/// GET /healthz
pub async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rooms = state.room_count().await;
    (StatusCode::OK, format!("ok rooms={}", rooms))
}
