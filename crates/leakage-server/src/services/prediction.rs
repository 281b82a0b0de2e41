//! Runs model inference off the async executor.

use std::sync::Arc;

use leakage_core::{ClaimsRequest, ModelError, Prediction};
use tracing::debug;

use super::model::ClaimsModel;

/// Scores a batch on the blocking pool. Output order matches `claims`.
pub async fn predict_batch(
    model: Arc<dyn ClaimsModel>,
    claims: Vec<ClaimsRequest>,
) -> Result<Vec<Prediction>, ModelError> {
    let count = claims.len();
    let predictions = tokio::task::spawn_blocking(move || model.predict(&claims))
        .await
        .map_err(|e| ModelError::Internal(format!("inference task failed: {e}")))??;

    if predictions.len() != count {
        return Err(ModelError::Internal(format!(
            "model returned {} predictions for {} claims",
            predictions.len(),
            count
        )));
    }
    debug!(count, "Scored claims");
    Ok(predictions)
}
