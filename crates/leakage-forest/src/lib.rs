//! Random forest classifier for claim leakage scoring.
//!
//! Everything needed on both sides of the model artifact lives here:
//!
//! - [`RandomForest`] and [`DecisionTree`] - CART trees with gini splits,
//!   bootstrap sampling and balanced class weights
//! - [`FeatureSchema`] - the one-hot / numeric layout used to turn a claim
//!   into a feature row
//! - [`ClassificationReport`] and [`roc_auc`] - hold-out evaluation
//! - [`ForestArtifact`] - the JSON document written by training and loaded by
//!   the API

mod artifact;
mod forest;
mod metrics;
mod schema;
mod tree;

pub use artifact::{ForestArtifact, ARTIFACT_FORMAT_VERSION};
pub use forest::{ClassWeight, ForestOptions, MaxFeatures, RandomForest};
pub use metrics::{roc_auc, AverageMetrics, ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use schema::{CategoricalEncoding, FeatureSchema, FeatureSource};
pub use tree::{DecisionTree, Node, TreeOptions};

use thiserror::Error;

/// Errors from fitting or validating a forest.
#[derive(Debug, Error)]
pub enum ForestError {
    #[error("Empty dataset")]
    EmptyDataset,
    #[error("Mismatched lengths: {rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("Row {row} has {actual} features, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },
    #[error("Label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },
    #[error("Need at least 2 classes in the training labels, found {0}")]
    SingleClass(usize),
    #[error("Invalid model: {0}")]
    Invalid(String),
}
