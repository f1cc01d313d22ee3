//! Column transformer: one-hot categorical columns, numeric passthrough

use std::collections::{BTreeSet, HashMap};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use crate::domain::dataset::{Column, ColumnData};
use crate::domain::feature::FeatureRow;

/// Vocabulary of one categorical column, sorted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoding {
    pub column: String,
    pub categories: Vec<String>,
}

impl CategoricalEncoding {
    fn position(&self, category: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()
    }
}

/// Fitted preprocessing step.
///
/// Output layout is every categorical block (in column order) followed by
/// every numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    categorical: Vec<CategoricalEncoding>,
    numeric: Vec<String>,
}

impl ColumnTransformer {
    /// Learn vocabularies from `rows` of `columns`
    pub fn fit(columns: &[&Column], rows: &[usize]) -> Self {
        let mut categorical = Vec::new();
        let mut numeric = Vec::new();

        for column in columns {
            match column.data() {
                ColumnData::Categorical(values) => {
                    let categories: BTreeSet<&str> =
                        rows.iter().map(|&r| values[r].as_str()).collect();
                    categorical.push(CategoricalEncoding {
                        column: column.name().to_string(),
                        categories: categories.into_iter().map(String::from).collect(),
                    });
                }
                ColumnData::Numeric(_) => numeric.push(column.name().to_string()),
            }
        }

        Self {
            categorical,
            numeric,
        }
    }

    pub fn categorical(&self) -> &[CategoricalEncoding] {
        &self.categorical
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    /// Names of the input columns this transformer expects
    pub fn input_columns(&self) -> impl Iterator<Item = &str> {
        self.categorical
            .iter()
            .map(|c| c.column.as_str())
            .chain(self.numeric.iter().map(String::as_str))
    }

    pub fn n_inputs(&self) -> usize {
        self.categorical.len() + self.numeric.len()
    }

    pub fn n_outputs(&self) -> usize {
        self.categorical
            .iter()
            .map(|c| c.categories.len())
            .sum::<usize>()
            + self.numeric.len()
    }

    /// Encode `rows` of a dataset
    pub fn transform(
        &self,
        columns: &[&Column],
        rows: &[usize],
    ) -> Result<Array2<f64>, PipelineError> {
        let by_name: HashMap<&str, &Column> = columns.iter().map(|c| (c.name(), *c)).collect();
        let lookup = |name: &str| {
            by_name
                .get(name)
                .copied()
                .ok_or_else(|| PipelineError::ColumnNotFound(name.to_string()))
        };

        let mut out = Array2::zeros((rows.len(), self.n_outputs()));
        let mut offset = 0;

        for encoding in &self.categorical {
            let column = lookup(&encoding.column)?;
            for (i, &r) in rows.iter().enumerate() {
                if let Some(pos) = encoding.position(&column.cell_text(r)) {
                    out[[i, offset + pos]] = 1.0;
                }
            }
            offset += encoding.categories.len();
        }

        for name in &self.numeric {
            let values = match lookup(name)?.data() {
                ColumnData::Numeric(values) => values,
                ColumnData::Categorical(values) => {
                    return Err(PipelineError::NotNumeric {
                        feature: name.clone(),
                        value: values.first().cloned().unwrap_or_default(),
                    });
                }
            };
            for (i, &r) in rows.iter().enumerate() {
                out[[i, offset]] = values[r];
            }
            offset += 1;
        }

        Ok(out)
    }

    /// Encode a single assembled feature row.
    ///
    /// The row must contain exactly the fitted input columns.
    pub fn transform_row(&self, row: &FeatureRow) -> Result<Array1<f64>, PipelineError> {
        let unknown: Vec<String> = row
            .keys()
            .filter(|k| !self.input_columns().any(|c| c == k.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(PipelineError::UnknownFeatures(unknown));
        }

        let missing: Vec<String> = self
            .input_columns()
            .filter(|c| !row.contains_key(*c))
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::MissingFeatures(missing));
        }

        let mut out = Array1::zeros(self.n_outputs());
        let mut offset = 0;

        for encoding in &self.categorical {
            let category = row[&encoding.column].as_category();
            if let Some(pos) = encoding.position(&category) {
                out[offset + pos] = 1.0;
            }
            offset += encoding.categories.len();
        }

        for name in &self.numeric {
            let value = &row[name];
            let number = value.as_number().ok_or_else(|| PipelineError::NotNumeric {
                feature: name.clone(),
                value: value.as_category(),
            })?;
            if !number.is_finite() {
                return Err(PipelineError::NonFinite(name.clone()));
            }
            out[offset] = number;
            offset += 1;
        }

        Ok(out)
    }
}
