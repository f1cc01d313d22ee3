//! Canonical feature defaults and row assembly

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::value::{FeaturePayload, FeatureRow, FeatureValue};
use crate::domain::dataset::{ColumnData, TrainingDataset};
use crate::domain::scenario::{Scenario, ScenarioConfig};
use crate::domain::DomainError;

/// Default value for every feature any scenario may need.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureTemplate {
    defaults: BTreeMap<String, FeatureValue>,
}

impl FeatureTemplate {
    pub fn new(defaults: BTreeMap<String, FeatureValue>) -> Self {
        Self { defaults }
    }

    /// Parse a template from its JSON object form
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::configuration(format!("Invalid feature template: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::internal(format!("Failed to serialize template: {}", e)))
    }

    /// Derive defaults from a dataset: median of numeric columns, most
    /// frequent value of categorical columns (ties go to the first seen).
    pub fn from_dataset(dataset: &TrainingDataset) -> Self {
        let defaults = dataset
            .columns()
            .iter()
            .filter(|c| !c.data().is_empty())
            .map(|column| {
                let value = match column.data() {
                    ColumnData::Numeric(values) => FeatureValue::Number(median(values)),
                    ColumnData::Categorical(values) => FeatureValue::Text(mode(values)),
                };
                (column.name().to_string(), value)
            })
            .collect();

        Self { defaults }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.defaults.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(String::as_str)
    }

    /// Build the feature row a scenario's model scores.
    ///
    /// Defaults are overlaid by the payload, then the scenario's excluded
    /// columns are removed. Keys unknown to the template pass through.
    pub fn assemble(&self, payload: &FeaturePayload, scenario: Scenario) -> FeatureRow {
        let mut row = self.defaults.clone();

        for (key, value) in payload {
            row.insert(key.clone(), value.clone());
        }

        for column in ScenarioConfig::exclusions(scenario) {
            row.remove(*column);
        }

        row
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn mode(values: &[String]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for value in values {
        let count = counts[value.as_str()];
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value.as_str(), count));
        }
    }

    best.map(|(v, _)| v.to_string()).unwrap_or_default()
}
