/*
 * Multi-Property Analysis
 *
 * Partition/restart controller: splits the property set into budgeted
 * batches, runs one fresh reachability analysis per batch and folds the
 * results into a violated / satisfied / unknown summary.
 *
 * Architecture:
 * - Domain: Partitioning, PropertySummary, PropertyStats, DecompositionStatistics
 * - Ports: PartitioningOperator, InitOperator, AnalysisFactory, StatisticsSink,
 *   PartitionBudgeting, PropertyBudgeting
 * - Infrastructure: budgeting, partitioning operators, resource limits
 * - Application: MultiPropertyAnalysis, CompositeAnalysisFactory
 */

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{ComponentBuilder, CompositeAnalysisFactory, MultiPropertyAnalysis};
pub use domain::{
    DecompositionStatistics, Partitioning, PartitioningStatus, PropertyReport, PropertyStats,
    PropertySummary, RefinementOrder, StatsHandle, VerificationResult,
};
pub use infrastructure::{
    AllInOneOperator, BasicPartitionBudgeting, BisectOperator, CheaperFirstDivideOperator,
    InitDefaultOperator, NoPropertyBudgeting, OneForEachOperator, ResourceLimit,
    ResourceLimitChecker, TargetHitBudgeting, TracingStatisticsSink,
};
pub use ports::{
    AnalysisFactory, InitOperator, PartitionAnalysis, PartitionBudgeting, PartitioningError,
    PartitioningOperator, PropertyBudgeting, StatisticsSink,
};
