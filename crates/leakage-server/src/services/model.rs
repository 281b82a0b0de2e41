//! Model wrappers and startup loading.

use std::sync::Arc;

use leakage_config::Settings;
use leakage_core::{ClaimsRequest, ModelError, Prediction};
use leakage_forest::ForestArtifact;
use leakage_storage::{ArtifactStore, StorageError, StorageUri};
use tracing::{info, warn};

pub const BASELINE_VERSION: &str = "v1";
pub const BASELINE_PROBABILITY: f64 = 0.1;

/// Scores claims. Implementations hold no mutable state.
pub trait ClaimsModel: Send + Sync {
    fn version(&self) -> &str;

    /// One prediction per claim, in input order.
    fn predict(&self, claims: &[ClaimsRequest]) -> Result<Vec<Prediction>, ModelError>;
}

/// Fixed-probability stand-in used when no trained artifact is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineModel;

impl ClaimsModel for BaselineModel {
    fn version(&self) -> &str {
        BASELINE_VERSION
    }

    fn predict(&self, claims: &[ClaimsRequest]) -> Result<Vec<Prediction>, ModelError> {
        Ok(claims
            .iter()
            .map(|c| Prediction::new(c.id_loss, BASELINE_PROBABILITY))
            .collect())
    }
}

/// A trained random forest loaded from the registry.
#[derive(Debug, Clone)]
pub struct ForestModel {
    artifact: ForestArtifact,
}

impl ForestModel {
    pub fn new(artifact: ForestArtifact) -> Self {
        Self { artifact }
    }
}

impl ClaimsModel for ForestModel {
    fn version(&self) -> &str {
        &self.artifact.model_version
    }

    fn predict(&self, claims: &[ClaimsRequest]) -> Result<Vec<Prediction>, ModelError> {
        claims
            .iter()
            .map(|c| {
                let p = self.artifact.positive_probability(c)?;
                Ok(Prediction::new(c.id_loss, p))
            })
            .collect()
    }
}

/// Loads the artifact named by `MODEL_URI`, or the baseline when it is unset.
pub async fn load_model(
    settings: &Settings,
    store: &dyn ArtifactStore,
) -> Result<Arc<dyn ClaimsModel>, ModelError> {
    let Some(raw_uri) = settings.model_uri.as_deref() else {
        warn!("MODEL_URI not set, serving baseline model {}", BASELINE_VERSION);
        return Ok(Arc::new(BaselineModel));
    };

    let uri: StorageUri = raw_uri
        .parse()
        .map_err(|e: StorageError| ModelError::ArtifactMissing(e.to_string()))?;
    info!("Loading {} model from {}", settings.model_type, uri);

    let bytes = store.get(&uri).await.map_err(|e| match e {
        StorageError::NotFound(what) => ModelError::ArtifactMissing(what),
        other => ModelError::Internal(format!("fetch {uri}: {other}")),
    })?;
    let artifact = ForestArtifact::from_json_slice(&bytes)?;

    if artifact.model_type != settings.model_type {
        return Err(ModelError::ModelTypeMismatch {
            expected: settings.model_type,
            actual: artifact.model_type,
        });
    }

    info!(
        version = %artifact.model_version,
        trees = artifact.forest.trees.len(),
        features = artifact.schema.len(),
        "Model loaded"
    );
    Ok(Arc::new(ForestModel::new(artifact)))
}
