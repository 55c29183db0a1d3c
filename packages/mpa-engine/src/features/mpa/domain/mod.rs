//! Multi-property domain: partitionings, verdicts, statistics

mod partitioning;
mod statistics;
mod summary;

pub use partitioning::{Partitioning, PartitioningStatus};
pub use statistics::{
    new_stats_handle, DecompositionStatistics, PropertyStats, RefinementOrder, StatsHandle,
};
pub use summary::{PropertyReport, PropertySummary, VerificationResult};
