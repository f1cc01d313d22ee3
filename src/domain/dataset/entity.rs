//! Training dataset entity

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::scenario::{FINAL_GRADE, OUTCOME_COLUMN};
use crate::domain::DomainError;

/// Typed column storage
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

/// A named dataset column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn is_numeric(&self) -> bool {
        self.data.is_numeric()
    }

    /// Cell rendered as text, the way it would be written back to CSV
    pub fn cell_text(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Numeric(v) => {
                let n = v[row];
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", n as i64)
                } else {
                    n.to_string()
                }
            }
            ColumnData::Categorical(v) => v[row].clone(),
        }
    }
}

/// Success/failure counts of the outcome column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDistribution {
    pub success: usize,
    pub failure: usize,
}

/// Row-per-student table with one column per feature
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingDataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl TrainingDataset {
    /// Build a dataset, checking column lengths and name uniqueness
    pub fn new(columns: Vec<Column>) -> Result<Self, DomainError> {
        let n_rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        let mut seen = HashSet::new();

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DomainError::dataset(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }

            if column.data.len() != n_rows {
                return Err(DomainError::dataset(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.data.len(),
                    n_rows
                )));
            }
        }

        Ok(Self { columns, n_rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Fail unless every named column is present
    pub fn require_columns(&self, required: &[&str]) -> Result<(), DomainError> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::dataset(format!("missing columns: {:?}", missing)))
        }
    }

    /// Ensure the outcome column exists, deriving it from the final grade.
    ///
    /// `success = 1` where the final grade is at least `threshold`.
    pub fn with_outcome(mut self, threshold: f64) -> Result<Self, DomainError> {
        if self.has_column(OUTCOME_COLUMN) {
            self.outcome()?;
            return Ok(self);
        }

        let grades = match self.column(FINAL_GRADE).map(|c| &c.data) {
            Some(ColumnData::Numeric(values)) => values,
            Some(ColumnData::Categorical(_)) => {
                return Err(DomainError::dataset(format!(
                    "column '{}' must be numeric",
                    FINAL_GRADE
                )));
            }
            None => {
                return Err(DomainError::dataset(format!(
                    "column '{}' or '{}' missing",
                    OUTCOME_COLUMN, FINAL_GRADE
                )));
            }
        };

        let derived = grades
            .iter()
            .map(|g| if *g >= threshold { 1.0 } else { 0.0 })
            .collect();
        self.columns.push(Column::numeric(OUTCOME_COLUMN, derived));

        Ok(self)
    }

    /// Binary outcome labels, validated to be 0 or 1
    pub fn outcome(&self) -> Result<Vec<u8>, DomainError> {
        let column = self.column(OUTCOME_COLUMN).ok_or_else(|| {
            DomainError::dataset(format!("column '{}' missing", OUTCOME_COLUMN))
        })?;

        match &column.data {
            ColumnData::Numeric(values) => values
                .iter()
                .enumerate()
                .map(|(row, v)| match *v {
                    x if x == 0.0 => Ok(0),
                    x if x == 1.0 => Ok(1),
                    x => Err(DomainError::dataset(format!(
                        "'{}' must be 0 or 1, got {} at row {}",
                        OUTCOME_COLUMN, x, row
                    ))),
                })
                .collect(),
            ColumnData::Categorical(_) => Err(DomainError::dataset(format!(
                "column '{}' must be numeric",
                OUTCOME_COLUMN
            ))),
        }
    }

    pub fn outcome_distribution(&self) -> Result<OutcomeDistribution, DomainError> {
        let labels = self.outcome()?;
        let success = labels.iter().filter(|l| **l == 1).count();

        Ok(OutcomeDistribution {
            success,
            failure: labels.len() - success,
        })
    }
}
