//! HTTP route handlers for the prediction API.

pub mod predict;

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::dto::HealthCheckResponse;
use crate::state::ServerState;

/// GET /api/v1/healthz - Liveness plus the served model version.
pub async fn healthz(State(state): State<Arc<ServerState>>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        model_version: state.model.version().to_string(),
    })
}
