//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use ratings::Session;
use serde::Serialize;

use super::ratings::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// How many of the read model's statements have been prepared so far.
    pub prepared_statements: usize,
}

/// GET /health — reports liveness and statement warm-up.
pub async fn check<S: Session + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        prepared_statements: state.read_model.prepared_statements(),
    })
}
