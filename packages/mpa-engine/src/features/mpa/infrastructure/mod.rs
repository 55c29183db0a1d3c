/*
 * Multi-Property Infrastructure
 *
 * Budgeting policies, partitioning operators, the default init operator,
 * the resource-limit checker and the tracing statistics sink.
 */

mod budgeting;
mod init_operator;
mod partitioning_operators;
mod resource_limits;
mod statistics_sink;

pub use budgeting::{
    property_budgeting_from_config, BasicPartitionBudgeting, NoPropertyBudgeting,
    TargetHitBudgeting,
};
pub use init_operator::InitDefaultOperator;
pub use partitioning_operators::{
    partitioning_operator_from_config, AllInOneOperator, BisectOperator,
    CheaperFirstDivideOperator, OneForEachOperator,
};
pub use resource_limits::{process_cpu_time, ResourceLimit, ResourceLimitChecker};
pub use statistics_sink::TracingStatisticsSink;
