/*
 * Configurable Program Analysis
 *
 * The component-analysis interface every other feature builds on.
 *
 * Architecture:
 * - Domain: AbstractState, Precision, Action, Block
 * - Ports: AbstractDomain, TransferRelation, MergeOperator, StopOperator,
 *          PrecisionAdjustment, Reducer, ProofChecker, ConfigurableProgramAnalysis
 * - Infrastructure: stock operators, LocationAnalysis
 *
 * References:
 * - Beyer, Henzinger, Théoduloz (2007) "Configurable Software Verification"
 */

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{
    AbstractState, Action, Block, DynValue, LocationState, Precision, PrecisionAdjustmentResult,
    ValueState,
};
pub use infrastructure::{
    EqualityDomain, LocationAnalysis, MergeJoinOperator, MergeSepOperator,
    StaticPrecisionAdjustment, StopSepOperator,
};
pub use ports::{
    AbstractDomain, ConfigurableProgramAnalysis, MergeOperator, PrecisionAdjustment,
    PrecisionAdjustmentOp, ProofChecker, Reducer, SimplePrecisionAdjustment, StopOperator,
    TransferRelation,
};
