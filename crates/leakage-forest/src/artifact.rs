use std::path::Path;

use leakage_core::{ModelError, ModelType};
use serde::{Deserialize, Serialize};

use crate::{FeatureSchema, FeatureSource, RandomForest};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Serialized model: everything the API needs to score a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub format_version: u32,
    /// Reported by the health endpoint.
    pub model_version: String,
    pub model_type: ModelType,
    pub schema: FeatureSchema,
    /// Class labels as they appeared in the training data; index 1 is "leakage".
    pub classes: Vec<String>,
    pub forest: RandomForest,
}

impl ForestArtifact {
    pub fn new(
        model_version: impl Into<String>,
        model_type: ModelType,
        schema: FeatureSchema,
        classes: Vec<String>,
        forest: RandomForest,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_version: model_version.into(),
            model_type,
            schema,
            classes,
            forest,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::ArtifactMalformed(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if self.model_version.trim().is_empty() {
            return Err(ModelError::ArtifactMalformed("empty model_version".to_string()));
        }
        if self.classes.len() != self.forest.n_classes {
            return Err(ModelError::ArtifactMalformed(format!(
                "{} class labels for a {}-class forest",
                self.classes.len(),
                self.forest.n_classes
            )));
        }
        if self.schema.len() != self.forest.n_features {
            return Err(ModelError::ArtifactMalformed(format!(
                "schema encodes {} features but forest expects {}",
                self.schema.len(),
                self.forest.n_features
            )));
        }
        self.forest
            .validate()
            .map_err(|e| ModelError::ArtifactMalformed(e.to_string()))
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>, ModelError> {
        serde_json::to_vec(self).map_err(|e| ModelError::Internal(e.to_string()))
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_slice(bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), ModelError> {
        let bytes = self.to_json_vec()?;
        std::fs::write(path, bytes)
            .map_err(|e| ModelError::Internal(format!("write {}: {e}", path.display())))
    }

    pub fn load_json(path: &Path) -> Result<Self, ModelError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ModelError::ArtifactMissing(path.display().to_string()));
            }
            Err(e) => return Err(ModelError::Internal(format!("read {}: {e}", path.display()))),
        };
        Self::from_json_slice(&bytes)
    }

    /// Probability of the positive (leakage) class for one input.
    pub fn positive_probability<S: FeatureSource + ?Sized>(&self, source: &S) -> Result<f64, ModelError> {
        let row = self.schema.encode(source)?;
        let proba = self.forest.predict_proba(&row);
        proba
            .get(1)
            .copied()
            .ok_or_else(|| ModelError::Internal("forest has no positive class".to_string()))
    }
}
