//! Scenario identifier and well-known column names

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// First-period grade column
pub const FIRST_PERIOD_GRADE: &str = "G1";

/// Second-period grade column
pub const SECOND_PERIOD_GRADE: &str = "G2";

/// Final grade column, source of the derived outcome
pub const FINAL_GRADE: &str = "G3";

/// Binary ground-truth column
pub const OUTCOME_COLUMN: &str = "success";

/// Inference configuration, named after how much of the term's grades are known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scenario {
    /// Both period grades available
    S2,
    /// Only the first-period grade available
    S3,
    /// No period grade available
    S4,
}

impl Scenario {
    /// All scenarios, ordered from most to least information
    pub const ALL: [Scenario; 3] = [Scenario::S2, Scenario::S3, Scenario::S4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S2 => "S2",
            Self::S3 => "S3",
            Self::S4 => "S4",
        }
    }

    /// File name of the persisted artifact for this scenario
    pub fn artifact_file_name(&self) -> &'static str {
        match self {
            Self::S2 => "model_s2.json",
            Self::S3 => "model_s3.json",
            Self::S4 => "model_s4.json",
        }
    }
}

impl FromStr for Scenario {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S2" => Ok(Self::S2),
            "S3" => Ok(Self::S3),
            "S4" => Ok(Self::S4),
            other => Err(DomainError::unknown_scenario(other)),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
