//! Scalar feature values

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A single feature value as supplied by a caller or a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Category label used by the one-hot encoder
    pub fn as_category(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl TryFrom<&serde_json::Value> for FeatureValue {
    type Error = DomainError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| DomainError::invalid_input(format!("number out of range: {}", n))),
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(DomainError::invalid_input(format!(
                "feature values must be numbers or strings, got {}",
                other
            ))),
        }
    }
}

/// Integral floats print without a fractional part, so `2.0` and `"2"` agree
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Caller-supplied, possibly partial, feature mapping
pub type FeaturePayload = BTreeMap<String, FeatureValue>;

/// Fully assembled, scenario-filtered feature mapping
pub type FeatureRow = BTreeMap<String, FeatureValue>;

/// Convert a raw JSON object into a typed payload.
///
/// Only numbers and strings are feature values; booleans, nulls, arrays and
/// objects are `InvalidInput`. Categorical yes/no features are sent as strings.
pub fn parse_payload(
    raw: &serde_json::Map<String, serde_json::Value>,
) -> Result<FeaturePayload, DomainError> {
    raw.iter()
        .map(|(key, value)| {
            FeatureValue::try_from(value)
                .map(|v| (key.clone(), v))
                .map_err(|e| DomainError::invalid_input(format!("feature '{}': {}", key, e)))
        })
        .collect()
}
