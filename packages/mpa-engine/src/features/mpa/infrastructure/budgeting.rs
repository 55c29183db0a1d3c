/*
 * Budgeting
 *
 * Partition budgeting: the wall/CPU limits a partition runs under, derived
 * from the partition size (a lone property may have its own limits).
 * Property budgeting: the in-run policy that disables a property once it
 * exhausted its share (target hits).
 */

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BudgetConfig;
use crate::features::mpa::domain::PropertyStats;
use crate::features::mpa::ports::{PartitionBudgeting, PropertyBudgeting};
use crate::shared::models::Property;

// ═══════════════════════════════════════════════════════════════════════════
// Partition budgeting
// ═══════════════════════════════════════════════════════════════════════════

/// Partition limits with optional per-property overrides for singletons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicPartitionBudgeting {
    partition_wall_time: Option<Duration>,
    partition_cpu_time: Option<Duration>,
    property_wall_time: Option<Duration>,
    property_cpu_time: Option<Duration>,
    factor: u32,
}

impl BasicPartitionBudgeting {
    pub fn unlimited() -> Self {
        Self {
            partition_wall_time: None,
            partition_cpu_time: None,
            property_wall_time: None,
            property_cpu_time: None,
            factor: 1,
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self {
            partition_wall_time: config.partition_wall_time_ms.map(Duration::from_millis),
            partition_cpu_time: config.partition_cpu_time_ms.map(Duration::from_millis),
            property_wall_time: config.property_wall_time_ms.map(Duration::from_millis),
            property_cpu_time: config.property_cpu_time_ms.map(Duration::from_millis),
            factor: 1,
        }
    }

    pub fn with_partition_wall_time(mut self, limit: Duration) -> Self {
        self.partition_wall_time = Some(limit);
        self
    }

    pub fn with_partition_cpu_time(mut self, limit: Duration) -> Self {
        self.partition_cpu_time = Some(limit);
        self
    }

    pub fn with_property_wall_time(mut self, limit: Duration) -> Self {
        self.property_wall_time = Some(limit);
        self
    }

    pub fn with_property_cpu_time(mut self, limit: Duration) -> Self {
        self.property_cpu_time = Some(limit);
        self
    }

    pub fn factor(&self) -> u32 {
        self.factor
    }

    fn select(
        &self,
        property_count: usize,
        partition: Option<Duration>,
        property: Option<Duration>,
    ) -> Option<Duration> {
        let base = if property_count == 1 {
            property.or(partition)
        } else {
            partition
        };
        base.map(|limit| limit.saturating_mul(self.factor))
    }
}

impl Default for BasicPartitionBudgeting {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl PartitionBudgeting for BasicPartitionBudgeting {
    fn wall_time_limit(&self, property_count: usize) -> Option<Duration> {
        self.select(
            property_count,
            self.partition_wall_time,
            self.property_wall_time,
        )
    }

    fn cpu_time_limit(&self, property_count: usize) -> Option<Duration> {
        self.select(property_count, self.partition_cpu_time, self.property_cpu_time)
    }

    fn budget_times_two(&self) -> Arc<dyn PartitionBudgeting> {
        Arc::new(Self {
            factor: self.factor.saturating_mul(2),
            ..self.clone()
        })
    }
}

impl fmt::Display for BasicPartitionBudgeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cpu) = self.cpu_time_limit(1) {
            write!(f, "CPU time: {:?}; ", cpu)?;
        }
        if let Some(wall) = self.wall_time_limit(1) {
            write!(f, "Wall time: {:?}; ", wall)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Property budgeting
// ═══════════════════════════════════════════════════════════════════════════

/// Never exhausts anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPropertyBudgeting;

impl PropertyBudgeting for NoPropertyBudgeting {
    fn is_exhausted(&self, _property: &Property, _stats: &PropertyStats) -> bool {
        false
    }
}

/// Exhausts a property after more than `max_hits` target hits in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetHitBudgeting {
    max_hits: u32,
}

impl TargetHitBudgeting {
    pub fn new(max_hits: u32) -> Self {
        Self { max_hits }
    }
}

impl PropertyBudgeting for TargetHitBudgeting {
    fn is_exhausted(&self, property: &Property, stats: &PropertyStats) -> bool {
        stats.target_hits(property) > self.max_hits
    }
}

/// Property budgeting described by `config`
pub fn property_budgeting_from_config(config: &BudgetConfig) -> Arc<dyn PropertyBudgeting> {
    match config.property_max_target_hits {
        Some(max_hits) => Arc::new(TargetHitBudgeting::new(max_hits)),
        None => Arc::new(NoPropertyBudgeting),
    }
}
