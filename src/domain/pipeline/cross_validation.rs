//! Stratified k-fold cross-validation

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::logistic::LogisticRegressionConfig;
use super::metrics::{accuracy, f1_score};
use super::pipeline::Pipeline;
use crate::domain::dataset::Column;

/// Train/test row indices of one fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffled, class-stratified fold splitter with a fixed seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Split row indices so every fold keeps the class proportions.
    ///
    /// Each class must have at least `n_splits` members.
    pub fn split(&self, labels: &[u8]) -> Result<Vec<Fold>, PipelineError> {
        if self.n_splits < 2 {
            return Err(PipelineError::InvalidFolds(self.n_splits));
        }

        let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (row, label) in labels.iter().enumerate() {
            by_class[usize::from(*label != 0)].push(row);
        }

        let smallest = by_class.iter().map(Vec::len).min().unwrap_or(0);
        if smallest < self.n_splits {
            return Err(PipelineError::TooFewSamples {
                folds: self.n_splits,
                found: smallest,
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut assignment = vec![0usize; labels.len()];
        let mut cursor = 0;

        for rows in by_class.iter_mut() {
            rows.shuffle(&mut rng);
            for row in rows.iter() {
                assignment[*row] = cursor % self.n_splits;
                cursor += 1;
            }
        }

        let folds = (0..self.n_splits)
            .map(|k| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|row| assignment[*row] == k);
                Fold { train, test }
            })
            .collect();

        Ok(folds)
    }
}

/// Per-fold and mean scores of a cross-validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub fold_accuracy: Vec<f64>,
    pub fold_f1: Vec<f64>,
    pub accuracy: f64,
    pub f1: f64,
}

/// Fit and score a fresh pipeline on every fold
pub fn cross_validate(
    columns: &[&Column],
    labels: &[u8],
    splitter: &StratifiedKFold,
    config: &LogisticRegressionConfig,
) -> Result<CrossValidationReport, PipelineError> {
    let folds = splitter.split(labels)?;
    let mut fold_accuracy = Vec::with_capacity(folds.len());
    let mut fold_f1 = Vec::with_capacity(folds.len());

    for fold in &folds {
        let train_labels: Vec<u8> = fold.train.iter().map(|r| labels[*r]).collect();
        let pipeline = Pipeline::fit(columns, &fold.train, &train_labels, config)?;

        let truth: Vec<u8> = fold.test.iter().map(|r| labels[*r]).collect();
        let predicted = pipeline.predict(columns, &fold.test)?;

        fold_accuracy.push(accuracy(&truth, &predicted));
        fold_f1.push(f1_score(&truth, &predicted));
    }

    Ok(CrossValidationReport {
        accuracy: mean(&fold_accuracy),
        f1: mean(&fold_f1),
        fold_accuracy,
        fold_f1,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels() -> Vec<u8> {
        (0..40).map(|i| u8::from(i % 4 == 0)).collect()
    }

    #[test]
    fn test_folds_partition_rows() {
        let labels = labels();
        let folds = StratifiedKFold::new(5, 42).split(&labels).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = HashSet::new();
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), labels.len());
            for row in &fold.test {
                assert!(seen.insert(*row), "row {row} tested twice");
            }
        }
        assert_eq!(seen.len(), labels.len());
    }

    #[test]
    fn test_folds_are_stratified() {
        let labels = labels();
        let folds = StratifiedKFold::new(5, 42).split(&labels).unwrap();

        for fold in &folds {
            let positives = fold.test.iter().filter(|r| labels[**r] == 1).count();
            assert_eq!(positives, 2);
            assert_eq!(fold.test.len(), 8);
        }
    }

    #[test]
    fn test_same_seed_same_folds() {
        let labels = labels();
        let a = StratifiedKFold::new(5, 42).split(&labels).unwrap();
        let b = StratifiedKFold::new(5, 42).split(&labels).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_samples() {
        let labels = vec![1, 1, 0, 0, 0, 0, 0];
        let err = StratifiedKFold::new(5, 42).split(&labels).unwrap_err();
        assert_eq!(err, PipelineError::TooFewSamples { folds: 5, found: 2 });
    }

    #[test]
    fn test_rejects_single_fold() {
        let err = StratifiedKFold::new(1, 42).split(&labels()).unwrap_err();
        assert_eq!(err, PipelineError::InvalidFolds(1));
    }

    #[test]
    fn test_cross_validate_is_reproducible() {
        let n = 60;
        let grade: Vec<f64> = (0..n).map(|i| (i % 20) as f64).collect();
        let labels: Vec<u8> = grade
            .iter()
            .enumerate()
            .map(|(i, g)| u8::from(*g >= 10.0 || i % 7 == 0))
            .collect();
        let school: Vec<String> = (0..n)
            .map(|i| if i % 3 == 0 { "MS" } else { "GP" }.to_string())
            .collect();
        let columns = vec![Column::numeric("G1", grade), Column::categorical("school", school)];
        let refs: Vec<&Column> = columns.iter().collect();

        let splitter = StratifiedKFold::new(5, 42);
        let config = LogisticRegressionConfig::default();
        let first = cross_validate(&refs, &labels, &splitter, &config).unwrap();
        let second = cross_validate(&refs, &labels, &splitter, &config).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.fold_accuracy.len(), 5);
        assert!(first.accuracy > 0.7, "accuracy {}", first.accuracy);
        assert!((0.0..=1.0).contains(&first.f1));
    }
}
