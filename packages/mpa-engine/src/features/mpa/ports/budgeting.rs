//! Budgeting ports: partition time limits and in-run property budgets.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::features::mpa::domain::PropertyStats;
use crate::shared::models::Property;

pub trait PartitionBudgeting: Send + Sync + fmt::Debug {
    /// Wall-time limit for a partition of `property_count` properties
    fn wall_time_limit(&self, property_count: usize) -> Option<Duration>;

    /// CPU-time limit for a partition of `property_count` properties
    fn cpu_time_limit(&self, property_count: usize) -> Option<Duration>;

    /// Same budgeting with every limit doubled
    fn budget_times_two(&self) -> Arc<dyn PartitionBudgeting>;

    /// True if a partition of `property_count` properties is time-limited
    fn is_limited(&self, property_count: usize) -> bool {
        self.wall_time_limit(property_count).is_some()
            || self.cpu_time_limit(property_count).is_some()
    }
}

pub trait PropertyBudgeting: Send + Sync + fmt::Debug {
    /// True once `property` used up its budget in the current run
    fn is_exhausted(&self, property: &Property, stats: &PropertyStats) -> bool;
}
