/*
 * Property & Decomposition Statistics
 *
 * `PropertyStats` is per-run bookkeeping written by the automaton analyses
 * and read by the controller: which properties were exercised, how much
 * work each one caused (the refinement-order hint for the partitioning
 * operator), target hits, and properties disabled by their budget.
 *
 * It is owned by the controller and handed to every fresh analysis through
 * a `StatsHandle`; resets are explicit.
 */

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::shared::models::{Property, PropertySet};

/// Shared handle to the per-run property statistics
pub type StatsHandle = Arc<Mutex<PropertyStats>>;

/// Create an empty statistics handle
pub fn new_stats_handle() -> StatsHandle {
    Arc::new(Mutex::new(PropertyStats::default()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStats {
    relevant: PropertySet,
    costs: BTreeMap<Property, u64>,
    target_hits: BTreeMap<Property, u32>,
    disabled: PropertySet,
}

impl PropertyStats {
    /// A transition relevant to `properties` fired
    pub fn signal_relevant_transition(&mut self, properties: &PropertySet) {
        for property in properties {
            self.relevant.insert(property.clone());
            *self.costs.entry(property.clone()).or_insert(0) += 1;
        }
    }

    /// Record a target hit; returns the hit count of this run
    pub fn signal_target_hit(&mut self, property: &Property) -> u32 {
        let hits = self.target_hits.entry(property.clone()).or_insert(0);
        *hits += 1;
        *hits
    }

    pub fn disable(&mut self, property: Property) {
        self.disabled.insert(property);
    }

    /// Properties exercised since the last `clear`
    pub fn relevant(&self) -> &PropertySet {
        &self.relevant
    }

    /// Properties disabled in the current run
    pub fn disabled(&self) -> &PropertySet {
        &self.disabled
    }

    pub fn target_hits(&self, property: &Property) -> u32 {
        self.target_hits.get(property).copied().unwrap_or(0)
    }

    pub fn cost(&self, property: &Property) -> u64 {
        self.costs.get(property).copied().unwrap_or(0)
    }

    /// Start a new run: forget disabled properties and target hits
    pub fn reset_for_new_run(&mut self) {
        self.disabled.clear();
        self.target_hits.clear();
    }

    /// Start a new partitioning: forget everything
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn refinement_order(&self) -> RefinementOrder {
        RefinementOrder {
            costs: self.costs.clone(),
        }
    }
}

/// Cheaper-first ordering of properties, ties broken by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefinementOrder {
    costs: BTreeMap<Property, u64>,
}

impl RefinementOrder {
    pub fn from_costs(costs: impl IntoIterator<Item = (Property, u64)>) -> Self {
        Self {
            costs: costs.into_iter().collect(),
        }
    }

    pub fn cost(&self, property: &Property) -> u64 {
        self.costs.get(property).copied().unwrap_or(0)
    }

    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        self.cost(a).cmp(&self.cost(b)).then_with(|| a.cmp(b))
    }

    pub fn sorted<'a>(&self, properties: impl IntoIterator<Item = &'a Property>) -> Vec<Property> {
        let mut result: Vec<Property> = properties.into_iter().cloned().collect();
        result.sort_by(|a, b| self.compare(a, b));
        result
    }
}

/// Counters of the restart loop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompositionStatistics {
    pub iterations: usize,
    pub restarts: usize,
    pub partition_adjustments: usize,
    pub partition_exhaustions: usize,
    #[serde(with = "duration_ms")]
    pub pure_analysis_time: Duration,
    /// Reached-set sizes at fixpoints
    pub reached_states_with_fixpoint: Vec<usize>,
    /// Reached-set sizes at fixpoints of runs with relevant properties
    pub reached_states_for_relevant_with_fixpoint: Vec<usize>,
    /// Reached-set sizes of runs that ended without a fixpoint
    pub reached_states_without_fixpoint: Vec<usize>,
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::property_set;

    #[test]
    fn test_relevant_and_costs() {
        let mut stats = PropertyStats::default();
        stats.signal_relevant_transition(&property_set(["a", "b"]));
        stats.signal_relevant_transition(&property_set(["a"]));

        assert_eq!(stats.relevant(), &property_set(["a", "b"]));
        assert_eq!(stats.cost(&"a".into()), 2);
        assert_eq!(stats.cost(&"b".into()), 1);
        assert_eq!(stats.cost(&"c".into()), 0);
    }

    #[test]
    fn test_resets() {
        let mut stats = PropertyStats::default();
        stats.signal_relevant_transition(&property_set(["a"]));
        assert_eq!(stats.signal_target_hit(&"a".into()), 1);
        assert_eq!(stats.signal_target_hit(&"a".into()), 2);
        stats.disable("a".into());

        stats.reset_for_new_run();
        assert!(stats.disabled().is_empty());
        assert_eq!(stats.target_hits(&"a".into()), 0);
        assert_eq!(stats.relevant(), &property_set(["a"]));

        stats.clear();
        assert_eq!(stats, PropertyStats::default());
    }

    #[test]
    fn test_refinement_order_cheaper_first() {
        let order = RefinementOrder::from_costs(vec![
            ("expensive".into(), 10),
            ("cheap".into(), 1),
        ]);
        let props = property_set(["expensive", "cheap", "free"]);
        let sorted: Vec<String> = order
            .sorted(props.iter())
            .into_iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(sorted, vec!["free", "cheap", "expensive"]);
    }

    #[test]
    fn test_decomposition_statistics_serialize() {
        let stats = DecompositionStatistics {
            iterations: 3,
            pure_analysis_time: Duration::from_millis(1500),
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["iterations"], 3);
        assert_eq!(json["pure_analysis_time"], 1500);
    }
}
