/*
 * Multi-Property Ports
 *
 * Seams of the partition/restart controller:
 * - PartitioningOperator: how properties are grouped into batches
 * - InitOperator: how a fresh reached set is seeded for a batch
 * - AnalysisFactory: fresh analysis + driver + reached set per batch
 * - StatisticsSink: where the final summary goes
 * - PartitionBudgeting / PropertyBudgeting: time limits per batch size and
 *   in-run property budgets
 */

mod budgeting;

pub use budgeting::{PartitionBudgeting, PropertyBudgeting};

use std::sync::Arc;

use thiserror::Error;

use crate::errors::{MpaError, Result};
use crate::features::cpa::ports::ConfigurableProgramAnalysis;
use crate::features::mpa::domain::{
    DecompositionStatistics, Partitioning, PropertySummary, RefinementOrder, StatsHandle,
};
use crate::features::reachability::domain::ReachedSet;
use crate::features::reachability::ports::ReachabilityDriver;
use crate::shared::interrupt::ShutdownNotifier;
use crate::shared::models::{Cfa, PropertySet};

#[derive(Debug, Error)]
pub enum PartitioningError {
    /// Nothing left to partition
    #[error("no properties left to partition")]
    NothingToCheck,

    /// The operator cannot split any further
    #[error("partitioning exhausted after {0}")]
    Exhausted(String),

    #[error("{0}")]
    Failed(String),
}

impl From<PartitioningError> for MpaError {
    fn from(err: PartitioningError) -> Self {
        MpaError::Partitioning(err.to_string())
    }
}

pub trait PartitioningOperator: Send + Sync {
    fn name(&self) -> &str;

    /// Next partitioning of `to_check` after `last` was run.
    ///
    /// `disabled` properties exhausted their budget in the last run and are
    /// left out; `order` ranks properties from cheap to expensive.
    fn partition(
        &self,
        last: &Partitioning,
        to_check: &PropertySet,
        disabled: &PropertySet,
        order: &RefinementOrder,
    ) -> std::result::Result<Partitioning, PartitioningError>;
}

pub trait InitOperator: Send + Sync {
    /// Seed `reached` for the first batch of `partitioning` and return the
    /// batches still to run afterwards.
    fn init(
        &self,
        all: &PropertySet,
        analysis: &dyn ConfigurableProgramAnalysis,
        reached: &mut ReachedSet,
        partitioning: &Partitioning,
        cfa: &Cfa,
    ) -> Result<Partitioning>;
}

/// Everything one batch runs with
pub struct PartitionAnalysis {
    pub analysis: Arc<dyn ConfigurableProgramAnalysis>,
    pub driver: Box<dyn ReachabilityDriver>,
    pub reached: ReachedSet,
}

pub trait AnalysisFactory: Send + Sync {
    /// Build a fresh analysis. Automaton components report into `stats`;
    /// the driver polls `shutdown`.
    fn create_fresh(
        &self,
        stats: &StatsHandle,
        shutdown: &ShutdownNotifier,
    ) -> Result<PartitionAnalysis>;
}

pub trait StatisticsSink: Send + Sync {
    fn report(&self, summary: &PropertySummary, statistics: &DecompositionStatistics);
}
