use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::tree::{DecisionTree, TreeOptions};
use crate::ForestError;

/// How rows are weighted by class during fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    Uniform,
    /// `n_samples / (n_classes * n_samples_of_class)`.
    Balanced,
}

/// Number of candidate features per split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    All,
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
            MaxFeatures::All => n_features.max(1),
        }
    }
}

/// Forest hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestOptions {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub class_weight: ClassWeight,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 8,
            min_samples_split: 10,
            class_weight: ClassWeight::Balanced,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Bagged ensemble of decision trees. Probabilities are the mean of the tree leaf distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        options: &ForestOptions,
    ) -> Result<Self, ForestError> {
        if x.len() != y.len() {
            return Err(ForestError::LengthMismatch { rows: x.len(), labels: y.len() });
        }
        if x.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        let n_features = x[0].len();
        if let Some((row, r)) = x.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(ForestError::RaggedRow { row, expected: n_features, actual: r.len() });
        }
        if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
            return Err(ForestError::LabelOutOfRange { label, n_classes });
        }
        let counts = class_counts(y, n_classes);
        let present = counts.iter().filter(|&&c| c > 0).count();
        if present < 2 {
            return Err(ForestError::SingleClass(present));
        }

        let weights = sample_weights(y, &counts, options.class_weight);
        let tree_options = TreeOptions {
            max_depth: options.max_depth,
            min_samples_split: options.min_samples_split,
            max_features: options.max_features.resolve(n_features),
        };
        info!(
            rows = x.len(),
            features = n_features,
            trees = options.n_trees,
            max_features = tree_options.max_features,
            "Fitting random forest"
        );

        let mut master = StdRng::seed_from_u64(options.seed);
        let n = x.len();
        let mut trees = Vec::with_capacity(options.n_trees);
        for tree_idx in 0..options.n_trees {
            let mut rng = StdRng::seed_from_u64(master.gen());
            let samples: Vec<usize> = if options.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            let tree = DecisionTree::fit(x, y, &weights, samples, n_classes, &tree_options, &mut rng);
            debug!(tree = tree_idx, nodes = tree.nodes.len(), depth = tree.depth(), "Tree grown");
            trees.push(tree);
        }

        Ok(Self { n_features, n_classes, trees })
    }

    /// Mean class distribution across trees.
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return out;
        }
        for tree in &self.trees {
            for (acc, p) in out.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        out.iter_mut().for_each(|p| *p /= n);
        out
    }

    /// Most probable class; ties go to the lower index.
    pub fn predict(&self, row: &[f64]) -> usize {
        let proba = self.predict_proba(row);
        let mut best = 0usize;
        for (idx, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = idx;
            }
        }
        best
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        if self.n_classes < 2 {
            return Err(ForestError::Invalid(format!("forest has {} classes", self.n_classes)));
        }
        if self.trees.is_empty() {
            return Err(ForestError::Invalid("forest has no trees".to_string()));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_classes, self.n_features)
                .map_err(|e| ForestError::Invalid(format!("tree {idx}: {e}")))?;
        }
        Ok(())
    }
}

fn class_counts(y: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &label in y {
        counts[label] += 1;
    }
    counts
}

fn sample_weights(y: &[usize], counts: &[usize], class_weight: ClassWeight) -> Vec<f64> {
    match class_weight {
        ClassWeight::Uniform => vec![1.0; y.len()],
        ClassWeight::Balanced => {
            let n = y.len() as f64;
            let k = counts.len() as f64;
            let per_class: Vec<f64> = counts
                .iter()
                .map(|&c| if c == 0 { 0.0 } else { n / (k * c as f64) })
                .collect();
            y.iter().map(|&label| per_class[label]).collect()
        }
    }
}
