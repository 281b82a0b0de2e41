use leakage_core::{ClaimsRequest, Prediction};
use serde::{Deserialize, Serialize};

// === HTTP DTOs ===

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub model_version: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub claims: Vec<ClaimsRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<Prediction>,
}
