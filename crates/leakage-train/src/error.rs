//! Training job errors. Every variant is fatal to the run.

use std::path::PathBuf;

use leakage_core::ModelError;
use leakage_forest::ForestError;
use leakage_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("Data file not found at {0}")]
    DataNotFound(PathBuf),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Required column missing: {0}")]
    MissingColumn(String),

    #[error("Invalid value {value:?} in column {column} at row {row}")]
    InvalidValue { row: usize, column: String, value: String },

    #[error("Cannot split {rows} rows: {reason}")]
    Split { rows: usize, reason: String },

    #[error("Model fit failed: {0}")]
    Fit(#[from] ForestError),

    #[error("Model serialization failed: {0}")]
    Serialize(#[source] ModelError),

    #[error("Feature encoding failed: {0}")]
    Encode(#[source] ModelError),

    #[error("Upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
