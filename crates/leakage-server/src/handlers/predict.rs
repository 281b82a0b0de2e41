use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::{error, info};

use crate::dto::{PredictRequest, PredictResponse};
use crate::error::AppError;
use crate::services::prediction::predict_batch;
use crate::state::ServerState;

/// POST /api/v1/predict - Scores each claim, one prediction per claim in order.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let count = req.claims.len();
    info!("Scoring {} claims", count);

    let predictions = predict_batch(state.model.clone(), req.claims)
        .await
        .map_err(|e| {
            error!("Prediction failed: {}", e);
            AppError::from(e)
        })?;

    Ok(Json(PredictResponse { predictions }))
}
