//! Static per-scenario column exclusions

use super::entity::{
    Scenario, FINAL_GRADE, FIRST_PERIOD_GRADE, OUTCOME_COLUMN, SECOND_PERIOD_GRADE,
};

/// Attributes no model may ever see
pub const SENSITIVE_FEATURES: [&str; 7] =
    ["sex", "address", "famsize", "Pstatus", "Mjob", "Fjob", "reason"];

const S2_EXCLUDE: [&str; 9] = [
    "sex",
    "address",
    "famsize",
    "Pstatus",
    "Mjob",
    "Fjob",
    "reason",
    FINAL_GRADE,
    OUTCOME_COLUMN,
];

const S3_EXCLUDE: [&str; 10] = [
    "sex",
    "address",
    "famsize",
    "Pstatus",
    "Mjob",
    "Fjob",
    "reason",
    FINAL_GRADE,
    OUTCOME_COLUMN,
    SECOND_PERIOD_GRADE,
];

const S4_EXCLUDE: [&str; 11] = [
    "sex",
    "address",
    "famsize",
    "Pstatus",
    "Mjob",
    "Fjob",
    "reason",
    FINAL_GRADE,
    OUTCOME_COLUMN,
    FIRST_PERIOD_GRADE,
    SECOND_PERIOD_GRADE,
];

/// Registry of the columns each scenario's feature matrix must not contain
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioConfig;

impl ScenarioConfig {
    /// Ordered exclusion set for `scenario`
    pub fn exclusions(scenario: Scenario) -> &'static [&'static str] {
        match scenario {
            Scenario::S2 => &S2_EXCLUDE,
            Scenario::S3 => &S3_EXCLUDE,
            Scenario::S4 => &S4_EXCLUDE,
        }
    }

    pub fn is_excluded(scenario: Scenario, column: &str) -> bool {
        Self::exclusions(scenario).contains(&column)
    }

    /// Columns of `columns` that `scenario` is allowed to use, order preserved
    pub fn feature_columns<'a, I>(scenario: Scenario, columns: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        columns
            .into_iter()
            .filter(|c| !Self::is_excluded(scenario, c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusions_are_nested() {
        for column in ScenarioConfig::exclusions(Scenario::S2) {
            assert!(ScenarioConfig::is_excluded(Scenario::S3, column), "{column}");
        }
        for column in ScenarioConfig::exclusions(Scenario::S3) {
            assert!(ScenarioConfig::is_excluded(Scenario::S4, column), "{column}");
        }
    }

    #[test]
    fn test_sensitive_attributes_always_excluded() {
        for scenario in Scenario::ALL {
            for column in SENSITIVE_FEATURES {
                assert!(ScenarioConfig::is_excluded(scenario, column));
            }
        }
    }

    #[test]
    fn test_grade_exclusions_grow() {
        assert!(!ScenarioConfig::is_excluded(Scenario::S2, "G1"));
        assert!(!ScenarioConfig::is_excluded(Scenario::S2, "G2"));
        assert!(!ScenarioConfig::is_excluded(Scenario::S3, "G1"));
        assert!(ScenarioConfig::is_excluded(Scenario::S3, "G2"));
        assert!(ScenarioConfig::is_excluded(Scenario::S4, "G1"));
        assert!(ScenarioConfig::is_excluded(Scenario::S4, "G2"));
    }

    #[test]
    fn test_feature_columns_preserve_order() {
        let columns = ["school", "sex", "age", "G1", "G2", "G3", "success"];
        assert_eq!(
            ScenarioConfig::feature_columns(Scenario::S3, columns),
            vec!["school", "age", "G1"]
        );
    }
}
