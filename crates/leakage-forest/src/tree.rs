//! CART decision tree with weighted gini impurity.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Maximum depth; the root is depth 0.
    pub max_depth: usize,
    /// A node with fewer samples than this becomes a leaf.
    pub min_samples_split: usize,
    /// Number of features drawn as split candidates at each node.
    pub max_features: usize,
}

/// A tree node stored in a flat arena. Children are indices into `nodes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        /// Rows with `value <= threshold` go left.
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Weighted class fractions, summing to 1.
        proba: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

struct Fit<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    options: &'a TreeOptions,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
    pivot: usize,
}

impl DecisionTree {
    /// Grows a tree over `samples`, which may repeat indices (bootstrap draws).
    ///
    /// `weights` is indexed by row, not by position in `samples`.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        weights: &[f64],
        samples: Vec<usize>,
        n_classes: usize,
        options: &TreeOptions,
        rng: &mut StdRng,
    ) -> Self {
        let ctx = Fit { x, y, weights, n_classes, options };
        let mut tree = DecisionTree { nodes: Vec::new() };
        tree.grow(&ctx, samples, 0, rng);
        tree
    }

    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return proba,
                Node::Split { feature, threshold, left, right } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Checks that every split points at existing children and every leaf has `n_classes` entries.
    pub fn validate(&self, n_classes: usize, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { proba } if proba.len() != n_classes => {
                    return Err(format!("leaf {idx} has {} classes, expected {n_classes}", proba.len()));
                }
                Node::Split { feature, left, right, .. } => {
                    if *feature >= n_features {
                        return Err(format!("node {idx} splits on feature {feature} of {n_features}"));
                    }
                    if *left <= idx || *right <= idx || *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("node {idx} has invalid children"));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn grow(&mut self, ctx: &Fit<'_>, mut samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let totals = class_totals(ctx, &samples);
        let total_weight: f64 = totals.iter().sum();
        let node_idx = self.nodes.len();

        let is_pure = totals.iter().filter(|&&w| w > 0.0).count() <= 1;
        if depth >= ctx.options.max_depth || samples.len() < ctx.options.min_samples_split.max(2) || is_pure {
            self.nodes.push(leaf(&totals, total_weight));
            return node_idx;
        }

        let Some(best) = best_split(ctx, &mut samples, &totals, total_weight, rng) else {
            self.nodes.push(leaf(&totals, total_weight));
            return node_idx;
        };

        // Reserve the slot; children are appended after it so indices only grow.
        self.nodes.push(Node::Leaf { proba: Vec::new() });

        sort_by_feature(ctx.x, &mut samples, best.feature);
        let right_samples = samples.split_off(best.pivot);
        let left = self.grow(ctx, samples, depth + 1, rng);
        let right = self.grow(ctx, right_samples, depth + 1, rng);

        tracing::trace!(node = node_idx, feature = best.feature, impurity = best.impurity, "split");
        self.nodes[node_idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_idx
    }
}

fn class_totals(ctx: &Fit<'_>, samples: &[usize]) -> Vec<f64> {
    let mut totals = vec![0.0; ctx.n_classes];
    for &i in samples {
        totals[ctx.y[i]] += ctx.weights[i];
    }
    totals
}

fn leaf(totals: &[f64], total_weight: f64) -> Node {
    let proba = if total_weight > 0.0 {
        totals.iter().map(|w| w / total_weight).collect()
    } else {
        vec![1.0 / totals.len() as f64; totals.len()]
    };
    Node::Leaf { proba }
}

fn gini(totals: &[f64], weight: f64) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    1.0 - totals.iter().map(|w| (w / weight).powi(2)).sum::<f64>()
}

fn sort_by_feature(x: &[Vec<f64>], samples: &mut [usize], feature: usize) {
    samples.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
}

fn best_split(
    ctx: &Fit<'_>,
    samples: &mut [usize],
    totals: &[f64],
    total_weight: f64,
    rng: &mut StdRng,
) -> Option<BestSplit> {
    let n_features = ctx.x.first().map_or(0, Vec::len);
    if n_features == 0 {
        return None;
    }
    let amount = ctx.options.max_features.clamp(1, n_features);
    let mut order: Vec<usize> = (0..n_features).collect();
    order.shuffle(rng);

    // Constant features do not count towards `amount`; keep drawing until enough usable ones are seen.
    let mut visited = 0usize;
    let mut best: Option<BestSplit> = None;
    for feature in order {
        if visited >= amount {
            break;
        }
        sort_by_feature(ctx.x, samples, feature);
        let first = ctx.x[samples[0]][feature];
        let last = ctx.x[samples[samples.len() - 1]][feature];
        if last <= first {
            continue;
        }
        visited += 1;

        let mut left = vec![0.0; ctx.n_classes];
        let mut left_weight = 0.0;
        for pos in 0..samples.len() - 1 {
            let i = samples[pos];
            left[ctx.y[i]] += ctx.weights[i];
            left_weight += ctx.weights[i];

            let lo = ctx.x[i][feature];
            let hi = ctx.x[samples[pos + 1]][feature];
            if hi <= lo {
                continue;
            }

            let right: Vec<f64> = totals.iter().zip(&left).map(|(t, l)| t - l).collect();
            let right_weight = total_weight - left_weight;
            let impurity =
                (left_weight * gini(&left, left_weight) + right_weight * gini(&right, right_weight)) / total_weight;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(BestSplit { feature, threshold, impurity, pivot: pos + 1 });
            }
        }
    }
    best
}
