//! Scenario domain - Which model variant serves a payload, and what it may see

mod config;
mod entity;
mod selector;

pub use config::{ScenarioConfig, SENSITIVE_FEATURES};
pub use entity::{
    Scenario, FINAL_GRADE, FIRST_PERIOD_GRADE, OUTCOME_COLUMN, SECOND_PERIOD_GRADE,
};
pub use selector::{select_scenario, FeatureKeys};
