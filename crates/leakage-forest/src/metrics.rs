//! Hold-out evaluation metrics for classifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Confusion matrix for a `K`-class classifier.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> Self {
        Self { n_classes, counts: vec![0; n_classes * n_classes] }
    }

    pub fn from_labels(n_classes: usize, truth: &[usize], predicted: &[usize]) -> Self {
        let mut cm = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted) {
            cm.add(t, p);
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u32,
}

/// Per-class precision/recall/f1 with accuracy and averages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    pub fn new(labels: &[String], truth: &[usize], predicted: &[usize]) -> Self {
        let cm = ConfusionMatrix::from_labels(labels.len(), truth, predicted);
        let k = cm.n_classes;

        let classes: Vec<ClassMetrics> = (0..k)
            .map(|c| {
                let tp = cm.get(c, c) as f64;
                let support: u32 = (0..k).map(|j| cm.get(c, j)).sum();
                let predicted_c: u32 = (0..k).map(|i| cm.get(i, c)).sum();
                let precision = ratio(tp, predicted_c as f64);
                let recall = ratio(tp, support as f64);
                let f1 = ratio(2.0 * precision * recall, precision + recall);
                ClassMetrics { label: labels[c].clone(), precision, recall, f1, support }
            })
            .collect();

        let total = cm.total();
        let correct: u64 = (0..k).map(|c| cm.get(c, c) as u64).sum();
        let support_total: u32 = classes.iter().map(|c| c.support).sum();

        let mean = |f: fn(&ClassMetrics) -> f64| ratio(classes.iter().map(f).sum(), k as f64);
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            ratio(classes.iter().map(|c| f(c) * c.support as f64).sum(), support_total as f64)
        };

        Self {
            accuracy: ratio(correct as f64, total as f64),
            macro_avg: AverageMetrics {
                precision: mean(|c| c.precision),
                recall: mean(|c| c.recall),
                f1: mean(|c| c.f1),
                support: support_total,
            },
            weighted_avg: AverageMetrics {
                precision: weighted(|c| c.precision),
                recall: weighted(|c| c.recall),
                f1: weighted(|c| c.f1),
                support: support_total,
            },
            classes,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "|              | precision | recall | f1-score | support |")?;
        writeln!(f, "|:-------------|----------:|-------:|---------:|--------:|")?;
        for c in &self.classes {
            writeln!(
                f,
                "| {:<12} | {:>9.3} | {:>6.3} | {:>8.3} | {:>7} |",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(
            f,
            "| {:<12} | {:>9} | {:>6} | {:>8.3} | {:>7} |",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "| {:<12} | {:>9.3} | {:>6.3} | {:>8.3} | {:>7} |",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

/// Area under the ROC curve for binary labels (1 = positive) via the rank statistic.
///
/// Tied scores share their average rank. Returns `None` when either class is absent.
pub fn roc_auc(truth: &[usize], scores: &[f64]) -> Option<f64> {
    let n = truth.len().min(scores.len());
    let n_pos = truth[..n].iter().filter(|&&t| t == 1).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_pos = 0.0;
    let mut start = 0usize;
    while start < n {
        let mut end = start + 1;
        while end < n && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // 1-based ranks start+1 ..= end share their mean.
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let positives = order[start..end].iter().filter(|&&i| truth[i] == 1).count();
        rank_sum_pos += avg_rank * positives as f64;
        start = end;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["0".to_string(), "1".to_string()]
    }

    #[test]
    fn test_report_counts() {
        let truth = [0, 0, 0, 1, 1];
        let predicted = [0, 0, 1, 1, 0];
        let report = ClassificationReport::new(&labels(), &truth, &predicted);

        assert!((report.accuracy - 0.6).abs() < 1e-12);
        let neg = &report.classes[0];
        assert!((neg.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((neg.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(neg.support, 3);
        let pos = &report.classes[1];
        assert!((pos.precision - 0.5).abs() < 1e-12);
        assert!((pos.recall - 0.5).abs() < 1e-12);
        assert_eq!(report.weighted_avg.support, 5);
        assert!((report.weighted_avg.recall - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_report_no_predictions_for_class() {
        let report = ClassificationReport::new(&labels(), &[0, 1], &[0, 0]);
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
        let table = report.to_string();
        assert!(table.contains("weighted avg"));
        assert!(table.contains("accuracy"));
    }

    #[test]
    fn test_roc_auc_perfect_and_inverted() {
        let truth = [0, 0, 1, 1];
        assert_eq!(roc_auc(&truth, &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
        assert_eq!(roc_auc(&truth, &[0.9, 0.8, 0.2, 0.1]), Some(0.0));
    }

    #[test]
    fn test_roc_auc_ties() {
        let truth = [0, 1, 0, 1];
        assert_eq!(roc_auc(&truth, &[0.5, 0.5, 0.5, 0.5]), Some(0.5));
        // One positive above all negatives, one tied with a negative.
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.4, 0.9]).unwrap();
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_single_class() {
        assert_eq!(roc_auc(&[1, 1], &[0.3, 0.4]), None);
    }
}
