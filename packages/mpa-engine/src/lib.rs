/*
 * MPA Engine - Multi-Property Reachability Analysis
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Property, CFA, interrupt flag)
 * - features/    : Vertical slices (cpa → automaton, composite → reachability → mpa)
 * - config/      : Presets, section builders, YAML
 *
 * Several safety properties of one program are checked together: each
 * property is an automaton tracked alongside the component analyses, and
 * the controller splits the property set into budgeted batches, restarting
 * the analysis per batch until every property has a verdict.
 */

#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::type_complexity)] // Operator tables are nested Arcs

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{MpaConfig, Preset, ValidatedConfig};
pub use errors::{MpaError, Result};

pub use shared::interrupt::{InterruptKind, ShutdownNotifier};
pub use shared::models::{
    property_set, Cfa, CfaBuilder, CfaEdge, EdgeKind, NodeId, Property, PropertySet,
};

pub use features::automaton::{
    Automaton, AutomatonAnalysis, AutomatonParser, EdgeMatcher, FileAutomaton,
    ForbiddenCallAutomaton, LockAutomaton, MemoryAutomaton, PowersetAutomatonAnalysis, StateKind,
    TransitionSpec,
};
pub use features::composite::{CompositeAnalysis, CompositePrecision, CompositeState};
pub use features::cpa::{
    AbstractDomain, AbstractState, Action, ConfigurableProgramAnalysis, LocationAnalysis,
    MergeOperator, Precision, PrecisionAdjustment, PrecisionAdjustmentOp, StopOperator,
    TransferRelation,
};
pub use features::mpa::{
    AnalysisFactory, CompositeAnalysisFactory, MultiPropertyAnalysis, Partitioning,
    PartitioningOperator, PartitioningStatus, PropertySummary, TracingStatisticsSink,
    VerificationResult,
};
pub use features::reachability::{
    AlgorithmStatus, CpaAlgorithm, ReachabilityDriver, ReachedSet, RunOutcome, StateId,
};
