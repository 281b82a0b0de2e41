//! Core domain types and error definitions for the leakage service.
//!
//! This crate provides the types shared by the training job and the API:
//!
//! - [`ModelError`] - Error type for model loading and prediction
//! - [`ClaimsRequest`] and [`PetSpecies`] - A single insurance claim
//! - [`Prediction`] - The leakage probability for one claim
//! - [`ModelType`] - Which model family an artifact belongs to
//!
//! # Example
//!
//! ```rust
//! use leakage_core::{ClaimsRequest, PetSpecies, Prediction};
//!
//! let claim = ClaimsRequest {
//!     id_loss: 7,
//!     pet_species: PetSpecies::Cat,
//!     ..ClaimsRequest::default()
//! };
//! assert_eq!(claim.numeric_feature("owner_age"), Some(42.0));
//! assert_eq!(claim.categorical_feature("pet_species"), Some("cat"));
//!
//! let prediction = Prediction::new(claim.id_loss, 0.37);
//! assert_eq!(prediction.id_loss, 7);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a model or running predictions.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No artifact exists at the configured location.
    #[error("Model artifact not found: {0}")]
    ArtifactMissing(String),

    /// The artifact exists but could not be decoded or failed validation.
    #[error("Model artifact is malformed: {0}")]
    ArtifactMalformed(String),

    /// The artifact was trained for a different model family.
    #[error("Model type mismatch: expected {expected}, artifact is {actual}")]
    ModelTypeMismatch { expected: ModelType, actual: ModelType },

    /// The artifact's feature schema names an input a claim does not carry.
    #[error("Claim has no feature named {0}")]
    MissingFeature(String),

    /// Anything else that went wrong during inference.
    #[error("Prediction failed: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::ArtifactMalformed(err.to_string())
    }
}

/// Model families served from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModelType {
    #[default]
    #[serde(rename = "claims")]
    ClaimsLeakage,
    #[serde(rename = "fraud_detection")]
    FraudDetection,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::ClaimsLeakage => "claims",
            ModelType::FraudDetection => "fraud_detection",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "claims" => Ok(ModelType::ClaimsLeakage),
            "fraud_detection" => Ok(ModelType::FraudDetection),
            other => Err(format!("unknown model type: {other}")),
        }
    }
}

/// Species of the insured pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetSpecies {
    #[default]
    Dog,
    Cat,
}

impl PetSpecies {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetSpecies::Dog => "dog",
            PetSpecies::Cat => "cat",
        }
    }
}

/// A single insurance claim submitted for scoring.
///
/// Missing JSON fields fall back to the example claim in [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsRequest {
    pub id_loss: i64,
    pub claim_amount: f64,
    pub pet_breed: String,
    pub pet_species: PetSpecies,
    pub owner_age: u32,
    pub number_of_previous_claims: u32,
    pub days_to_claim: u32,
    pub policy_tenure: u32,
}

impl Default for ClaimsRequest {
    fn default() -> Self {
        Self {
            id_loss: 1001,
            claim_amount: 450.75,
            pet_breed: "labrador".to_string(),
            pet_species: PetSpecies::Dog,
            owner_age: 42,
            number_of_previous_claims: 2,
            days_to_claim: 5,
            policy_tenure: 12,
        }
    }
}

impl ClaimsRequest {
    /// Looks up a numeric attribute by its training-data column name.
    pub fn numeric_feature(&self, column: &str) -> Option<f64> {
        match column {
            "claim_amount" => Some(self.claim_amount),
            "owner_age" => Some(self.owner_age as f64),
            "number_of_previous_claims" => Some(self.number_of_previous_claims as f64),
            "days_to_claim" => Some(self.days_to_claim as f64),
            "policy_tenure" => Some(self.policy_tenure as f64),
            _ => None,
        }
    }

    /// Looks up a categorical attribute by its training-data column name.
    pub fn categorical_feature(&self, column: &str) -> Option<&str> {
        match column {
            "pet_species" => Some(self.pet_species.as_str()),
            "pet_breed" => Some(self.pet_breed.as_str()),
            _ => None,
        }
    }
}

/// Leakage probability for one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id_loss: i64,
    pub leakage_probability: f64,
}

impl Prediction {
    /// Creates a prediction, clamping the probability into `[0, 1]`.
    pub fn new(id_loss: i64, leakage_probability: f64) -> Self {
        let leakage_probability = if leakage_probability.is_nan() {
            0.0
        } else {
            leakage_probability.clamp(0.0, 1.0)
        };
        Self { id_loss, leakage_probability }
    }
}
