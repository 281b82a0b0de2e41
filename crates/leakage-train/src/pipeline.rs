//! The training job: load, encode, split, fit, evaluate, persist, upload.

use std::path::{Path, PathBuf};

use leakage_core::ModelType;
use leakage_forest::{roc_auc, ClassificationReport, ForestArtifact, ForestOptions, RandomForest};
use leakage_storage::{ArtifactStore, StorageUri};
use tracing::{info, warn};

use crate::data::load_data;
use crate::error::TrainError;
use crate::preprocess::{preprocess_data, Prepared};
use crate::split::stratified_split;

pub const DEFAULT_DATA_PATH: &str = "data/leakage_data.csv";
pub const ARTIFACT_FILE_NAME: &str = "model.json";
pub const TEST_FRACTION: f64 = 0.2;

/// Inputs for one training run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub output: StorageUri,
    pub scratch_dir: PathBuf,
    pub model_version: String,
    pub forest: ForestOptions,
    pub test_fraction: f64,
}

impl TrainConfig {
    pub fn new(output: StorageUri) -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output,
            scratch_dir: PathBuf::from("."),
            model_version: "v1".to_string(),
            forest: ForestOptions::default(),
            test_fraction: TEST_FRACTION,
        }
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.scratch_dir.join(ARTIFACT_FILE_NAME)
    }
}

/// Evaluation on the held-out rows.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub report: ClassificationReport,
    /// `None` when the test set holds a single class.
    pub roc_auc: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub evaluation: Evaluation,
    pub output: StorageUri,
}

/// Runs every stage in order. The first failing stage ends the run.
pub async fn run(config: &TrainConfig, store: &dyn ArtifactStore) -> Result<TrainSummary, TrainError> {
    info!("--- MLOps Training Job Started ---");

    let table = load_data(&config.data_path)?;
    let prepared = preprocess_data(&table)?;

    let split = stratified_split(&prepared.y, config.test_fraction, config.forest.seed)?;
    let (x_train, y_train) = select(&prepared, &split.train);
    let (x_test, y_test) = select(&prepared, &split.test);
    info!("Training samples: {}, Test samples: {}", x_train.len(), x_test.len());

    let forest = train_model(&x_train, &y_train, prepared.classes.len(), &config.forest)?;
    let evaluation = evaluate_model(&forest, &prepared.classes, &x_test, &y_test);

    let artifact = ForestArtifact::new(
        config.model_version.clone(),
        ModelType::ClaimsLeakage,
        prepared.schema,
        prepared.classes,
        forest,
    );
    let local = config.scratch_path();
    save_model(&artifact, &local)?;
    upload_model(store, &local, &config.output).await?;
    cleanup(&local)?;

    info!("--- MLOps Training Job Finished Successfully ---");
    Ok(TrainSummary {
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        evaluation,
        output: config.output.clone(),
    })
}

fn select(prepared: &Prepared, rows: &[usize]) -> (Vec<Vec<f64>>, Vec<usize>) {
    rows.iter()
        .map(|&i| (prepared.x[i].clone(), prepared.y[i]))
        .unzip()
}

pub fn train_model(
    x: &[Vec<f64>],
    y: &[usize],
    n_classes: usize,
    options: &ForestOptions,
) -> Result<RandomForest, TrainError> {
    info!("Starting model training...");
    let forest = RandomForest::fit(x, y, n_classes, options)?;
    info!("Model training complete.");
    Ok(forest)
}

/// Scores the held-out rows and logs the report.
pub fn evaluate_model(forest: &RandomForest, classes: &[String], x: &[Vec<f64>], y: &[usize]) -> Evaluation {
    let mut predicted = Vec::with_capacity(x.len());
    let mut scores = Vec::with_capacity(x.len());
    for row in x {
        predicted.push(forest.predict(row));
        scores.push(forest.predict_proba(row).get(1).copied().unwrap_or(0.0));
    }

    let report = ClassificationReport::new(classes, y, &predicted);
    info!("\n--- Classification Report ---\n{}", report);

    let auc = roc_auc(y, &scores);
    match auc {
        Some(auc) => info!("ROC AUC Score: {:.3}", auc),
        None => warn!("ROC AUC Score: undefined (test set has a single class)"),
    }

    Evaluation { report, roc_auc: auc }
}

pub fn save_model(artifact: &ForestArtifact, path: &Path) -> Result<(), TrainError> {
    artifact.save_json(path).map_err(TrainError::Serialize)?;
    info!("Model serialized locally as {}", path.display());
    Ok(())
}

pub async fn upload_model(store: &dyn ArtifactStore, local: &Path, dest: &StorageUri) -> Result<(), TrainError> {
    info!("Uploading {} to {}", local.display(), dest);
    store.put(local, dest).await?;
    info!("Model successfully uploaded to {}", dest);
    Ok(())
}

fn cleanup(local: &Path) -> Result<(), TrainError> {
    std::fs::remove_file(local)?;
    info!("Cleaned up local file {}", local.display());
    Ok(())
}
