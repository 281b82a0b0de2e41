//! Seeded stratified train/test split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::TrainError;

/// Row indices for each side of the split, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits rows so each class keeps its share on both sides.
///
/// The test side has exactly `ceil(n * test_fraction)` rows. Per-class test
/// counts are the floor of the proportional share, with leftover rows going to
/// the classes with the largest remainders.
pub fn stratified_split(y: &[usize], test_fraction: f64, seed: u64) -> Result<SplitIndices, TrainError> {
    let n = y.len();
    let fail = |reason: String| TrainError::Split { rows: n, reason };

    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(fail(format!("test fraction {test_fraction} must be in (0, 1)")));
    }
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    let n_train = n.saturating_sub(n_test);

    let n_classes = y.iter().max().map_or(0, |m| m + 1);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (idx, &label) in y.iter().enumerate() {
        by_class[label].push(idx);
    }
    by_class.retain(|rows| !rows.is_empty());

    if by_class.len() < 2 {
        return Err(fail("need at least 2 classes to stratify".to_string()));
    }
    if n_test < by_class.len() || n_train < by_class.len() {
        return Err(fail(format!(
            "{n_train} train / {n_test} test rows cannot hold {} classes",
            by_class.len()
        )));
    }

    let quotas = allocate(&by_class, n_test, n);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);
    for (mut rows, quota) in by_class.into_iter().zip(quotas) {
        rows.shuffle(&mut rng);
        let kept = rows.split_off(quota);
        test.extend(rows);
        train.extend(kept);
    }
    train.sort_unstable();
    test.sort_unstable();

    Ok(SplitIndices { train, test })
}

fn allocate(by_class: &[Vec<usize>], n_test: usize, n: usize) -> Vec<usize> {
    let shares: Vec<f64> = by_class
        .iter()
        .map(|rows| rows.len() as f64 * n_test as f64 / n as f64)
        .collect();
    let mut quotas: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = shares[a] - shares[a].floor();
        let rb = shares[b] - shares[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    let mut remaining = n_test - quotas.iter().sum::<usize>();
    for class in order.into_iter().cycle() {
        if remaining == 0 {
            break;
        }
        if quotas[class] < by_class[class].len() {
            quotas[class] += 1;
            remaining -= 1;
        }
    }
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(negatives: usize, positives: usize) -> Vec<usize> {
        let mut y = vec![0; negatives];
        y.extend(std::iter::repeat(1).take(positives));
        y
    }

    #[test]
    fn test_thousand_rows_split_800_200() {
        let y = labels(850, 150);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.train.len(), 800);
        assert_eq!(split.test.len(), 200);

        let test_pos = split.test.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(test_pos, 30);
    }

    #[test]
    fn test_same_seed_same_split() {
        let y = labels(700, 300);
        let a = stratified_split(&y, 0.2, 42).unwrap();
        let b = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let c = stratified_split(&y, 0.2, 7).unwrap();
        assert_eq!(c.test.len(), a.test.len());
    }

    #[test]
    fn test_sides_are_disjoint_and_complete() {
        let y = labels(37, 13);
        let split = stratified_split(&y, 0.2, 1).unwrap();
        assert_eq!(split.test.len(), 10);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_remainder_goes_to_largest_fraction() {
        // 10 test rows over 33/17: shares 6.6 and 3.4.
        let y = labels(33, 17);
        let split = stratified_split(&y, 0.2, 3).unwrap();
        let test_pos = split.test.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(split.test.len(), 10);
        assert_eq!(test_pos, 3);
    }

    #[test]
    fn test_single_class_rejected() {
        assert!(matches!(stratified_split(&[0, 0, 0], 0.2, 42), Err(TrainError::Split { .. })));
    }

    #[test]
    fn test_too_few_rows_rejected() {
        assert!(stratified_split(&[0, 1], 0.2, 42).is_err());
    }
}
