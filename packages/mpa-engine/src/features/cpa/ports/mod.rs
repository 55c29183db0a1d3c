/*
 * Analysis Ports
 *
 * The operator contract every pluggable analysis implements: abstract
 * domain, transfer relation, merge, stop and precision adjustment, plus
 * the optional reducer and proof checker.
 *
 * All operators are shared between threads (`Send + Sync`) and are handed
 * out as `Arc`s once, when the analysis is assembled, so hot loops never
 * look anything up at run time.
 */

use std::sync::Arc;

use crate::errors::Result;
use crate::features::cpa::domain::{
    AbstractState, Action, Block, Precision, PrecisionAdjustmentResult,
};
use crate::features::mpa::ports::PropertyBudgeting;
use crate::features::reachability::domain::ReachedSet;
use crate::shared::models::{CfaEdge, NodeId, PropertySet};

/// Lattice operations of an abstract domain
pub trait AbstractDomain: Send + Sync {
    fn join(&self, state1: &AbstractState, state2: &AbstractState) -> Result<AbstractState>;

    /// `state1 ⊑ state2`
    fn is_less_or_equal(&self, state1: &AbstractState, state2: &AbstractState) -> Result<bool>;
}

/// Successor computation along CFA edges
pub trait TransferRelation: Send + Sync {
    /// Successors of `state` for `edge`. An empty result means the edge is
    /// infeasible from `state`.
    fn successors_for_edge(
        &self,
        state: &AbstractState,
        precision: &Precision,
        edge: &CfaEdge,
    ) -> Result<Vec<AbstractState>>;

    /// Refine `state` using the sibling states of the same composite
    /// successor. `None` means "no change"; an empty list prunes the successor.
    fn strengthen(
        &self,
        _state: &AbstractState,
        _siblings: &[AbstractState],
        _edge: &CfaEdge,
        _precision: &Precision,
    ) -> Result<Option<Vec<AbstractState>>> {
        Ok(None)
    }
}

/// Merge of a new successor into an existing reached state
pub trait MergeOperator: Send + Sync {
    /// Returns the state that should replace `reached`; returning `reached`
    /// itself means "do not merge".
    fn merge(
        &self,
        successor: &AbstractState,
        reached: &AbstractState,
        precision: &Precision,
    ) -> Result<AbstractState>;

    /// True for the merge that never merges
    fn is_sep(&self) -> bool {
        false
    }
}

/// Coverage check
pub trait StopOperator: Send + Sync {
    /// True if `state` is covered by one of `reached`
    fn stop(
        &self,
        state: &AbstractState,
        reached: &[&AbstractState],
        precision: &Precision,
    ) -> Result<bool>;
}

/// Precision adjustment that may replace the state and the precision
pub trait PrecisionAdjustment: Send + Sync {
    /// `None` means the state is bottom and must be dropped.
    fn prec(
        &self,
        state: &AbstractState,
        precision: &Precision,
        reached: &ReachedSet,
        full_state: &AbstractState,
    ) -> Result<Option<PrecisionAdjustmentResult>>;
}

/// Precision adjustment that only decides the action from the state
pub trait SimplePrecisionAdjustment: Send + Sync {
    fn prec(&self, state: &AbstractState, precision: &Precision) -> Result<Action>;
}

/// Either kind of precision adjustment
#[derive(Clone)]
pub enum PrecisionAdjustmentOp {
    Simple(Arc<dyn SimplePrecisionAdjustment>),
    Full(Arc<dyn PrecisionAdjustment>),
}

impl PrecisionAdjustmentOp {
    pub fn is_simple(&self) -> bool {
        matches!(self, PrecisionAdjustmentOp::Simple(_))
    }

    /// Run the adjustment whatever its kind
    pub fn apply(
        &self,
        state: &AbstractState,
        precision: &Precision,
        reached: &ReachedSet,
        full_state: &AbstractState,
    ) -> Result<Option<PrecisionAdjustmentResult>> {
        match self {
            PrecisionAdjustmentOp::Simple(op) => {
                let action = op.prec(state, precision)?;
                Ok(Some(
                    PrecisionAdjustmentResult::unchanged(state.clone(), precision.clone())
                        .with_action(action),
                ))
            }
            PrecisionAdjustmentOp::Full(op) => op.prec(state, precision, reached, full_state),
        }
    }
}

/// State/precision reduction for block summaries
pub trait Reducer: Send + Sync {
    fn reduced_state(&self, expanded: &AbstractState, block: &Block) -> Result<AbstractState>;

    fn expanded_state(
        &self,
        root: &AbstractState,
        block: &Block,
        reduced: &AbstractState,
    ) -> Result<AbstractState>;

    fn reduced_precision(&self, precision: &Precision, block: &Block) -> Result<Precision>;

    fn expanded_precision(
        &self,
        root_precision: &Precision,
        block: &Block,
        reduced_precision: &Precision,
    ) -> Result<Precision>;

    /// Cache key of a reduced state
    fn state_key(&self, state: &AbstractState, precision: &Precision, block: &Block) -> u64;
}

/// Certificate checking
pub trait ProofChecker: Send + Sync {
    /// True if `claimed` covers every successor of `state` for `edge`
    fn are_abstract_successors(
        &self,
        state: &AbstractState,
        precision: &Precision,
        edge: &CfaEdge,
        claimed: &[AbstractState],
    ) -> Result<bool>;

    fn is_covered_by(&self, state: &AbstractState, other: &AbstractState) -> Result<bool>;
}

/// A configurable program analysis: the five operators plus lifecycle hooks
pub trait ConfigurableProgramAnalysis: Send + Sync {
    fn name(&self) -> &str;

    fn abstract_domain(&self) -> Arc<dyn AbstractDomain>;
    fn transfer_relation(&self) -> Arc<dyn TransferRelation>;
    fn merge_operator(&self) -> Arc<dyn MergeOperator>;
    fn stop_operator(&self) -> Arc<dyn StopOperator>;
    fn precision_adjustment(&self) -> PrecisionAdjustmentOp;

    fn reducer(&self) -> Option<Arc<dyn Reducer>> {
        None
    }

    fn proof_checker(&self) -> Option<Arc<dyn ProofChecker>> {
        None
    }

    fn initial_state(&self, node: NodeId) -> Result<AbstractState>;
    fn initial_precision(&self, node: NodeId) -> Result<Precision>;

    /// Properties this analysis checks
    fn encoded_properties(&self) -> PropertySet {
        PropertySet::new()
    }

    /// Drop memo tables
    fn clear_caches(&self) {}

    /// Install the budgeting policy of the current partition
    fn set_property_budgeting(&self, _budgeting: Arc<dyn PropertyBudgeting>) {}
}
