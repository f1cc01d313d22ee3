//! Scenario selection from key presence

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use super::entity::{Scenario, FIRST_PERIOD_GRADE, SECOND_PERIOD_GRADE};

/// Anything that can answer "is this feature key present"
pub trait FeatureKeys {
    fn has_feature(&self, name: &str) -> bool;
}

impl<V> FeatureKeys for BTreeMap<String, V> {
    fn has_feature(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl<V, S: BuildHasher> FeatureKeys for HashMap<String, V, S> {
    fn has_feature(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl FeatureKeys for serde_json::Map<String, serde_json::Value> {
    fn has_feature(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// Pick the scenario for a payload.
///
/// Only key membership matters: a grade of `0` is present. A second-period
/// grade without a first-period grade is incoherent and falls back to S4.
pub fn select_scenario<P: FeatureKeys + ?Sized>(payload: &P) -> Scenario {
    let has_first = payload.has_feature(FIRST_PERIOD_GRADE);
    let has_second = payload.has_feature(SECOND_PERIOD_GRADE);

    match (has_first, has_second) {
        (false, true) => Scenario::S4,
        (true, true) => Scenario::S2,
        (true, false) => Scenario::S3,
        (false, false) => Scenario::S4,
    }
}
