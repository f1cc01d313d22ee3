//! Preprocessing composed with the classifier

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::encoder::ColumnTransformer;
use super::error::PipelineError;
use super::logistic::{LogisticRegression, LogisticRegressionConfig};
use crate::domain::dataset::Column;
use crate::domain::feature::FeatureRow;
use crate::domain::model::label_for;

/// Fitted preprocessing + logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    preprocessor: ColumnTransformer,
    classifier: LogisticRegression,
}

impl Pipeline {
    /// Fit on `rows` of `columns` with matching 0/1 `labels`
    pub fn fit(
        columns: &[&Column],
        rows: &[usize],
        labels: &[u8],
        config: &LogisticRegressionConfig,
    ) -> Result<Self, PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::EmptyTrainingSet);
        }

        let preprocessor = ColumnTransformer::fit(columns, rows);
        let x = preprocessor.transform(columns, rows)?;
        let y: Array1<f64> = labels.iter().map(|l| f64::from(*l)).collect();
        let classifier = LogisticRegression::fit(x.view(), y.view(), config)?;

        Ok(Self {
            preprocessor,
            classifier,
        })
    }

    pub fn preprocessor(&self) -> &ColumnTransformer {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    /// Input feature names the pipeline was fitted on
    pub fn feature_names(&self) -> Vec<&str> {
        self.preprocessor.input_columns().collect()
    }

    pub fn n_features(&self) -> usize {
        self.preprocessor.n_inputs()
    }

    /// Positive-class probabilities for `rows` of a dataset
    pub fn predict_proba(
        &self,
        columns: &[&Column],
        rows: &[usize],
    ) -> Result<Array1<f64>, PipelineError> {
        let x = self.preprocessor.transform(columns, rows)?;
        Ok(self.classifier.predict_proba(x.view()))
    }

    /// Thresholded labels for `rows` of a dataset
    pub fn predict(&self, columns: &[&Column], rows: &[usize]) -> Result<Vec<u8>, PipelineError> {
        Ok(self
            .predict_proba(columns, rows)?
            .iter()
            .map(|p| label_for(*p))
            .collect())
    }

    /// Positive-class probability for one assembled feature row
    pub fn predict_proba_row(&self, row: &FeatureRow) -> Result<f64, PipelineError> {
        let x = self.preprocessor.transform_row(row)?;
        Ok(self.classifier.predict_proba_one(x.view()))
    }
}
