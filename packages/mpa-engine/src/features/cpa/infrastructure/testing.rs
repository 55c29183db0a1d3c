//! Toy component analysis for unit tests: states are sets of small integers.
//!
//! Edge labels drive the transfer: `add N` inserts N, `fork` yields two
//! successors, `kill` yields none, anything else is the identity.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::{MpaError, Result};
use crate::features::cpa::domain::{AbstractState, Action, Block, Precision, ValueState};
use crate::features::cpa::ports::{
    AbstractDomain, ConfigurableProgramAnalysis, MergeOperator, PrecisionAdjustmentOp, Reducer,
    SimplePrecisionAdjustment, StopOperator, TransferRelation,
};
use crate::shared::models::{CfaEdge, NodeId};

use super::operators::{MergeJoinOperator, MergeSepOperator, StaticPrecisionAdjustment, StopSepOperator};

pub(crate) fn set_state(items: &[u8]) -> AbstractState {
    ValueState::new(items.iter().copied().collect::<BTreeSet<u8>>()).into()
}

pub(crate) fn as_set(state: &AbstractState) -> Result<&BTreeSet<u8>> {
    state
        .as_value()
        .and_then(|v| v.downcast_ref::<BTreeSet<u8>>())
        .ok_or_else(|| MpaError::transfer(format!("expected a set state, got {}", state.kind_name())))
}

pub(crate) struct SetDomain;

impl AbstractDomain for SetDomain {
    fn join(&self, state1: &AbstractState, state2: &AbstractState) -> Result<AbstractState> {
        let union: BTreeSet<u8> = as_set(state1)?.union(as_set(state2)?).copied().collect();
        Ok(ValueState::new(union).into())
    }

    fn is_less_or_equal(&self, state1: &AbstractState, state2: &AbstractState) -> Result<bool> {
        Ok(as_set(state1)?.is_subset(as_set(state2)?))
    }
}

pub(crate) struct SetTransfer;

impl TransferRelation for SetTransfer {
    fn successors_for_edge(
        &self,
        state: &AbstractState,
        _precision: &Precision,
        edge: &CfaEdge,
    ) -> Result<Vec<AbstractState>> {
        let set = as_set(state)?;
        let with = |x: u8| {
            let mut next = set.clone();
            next.insert(x);
            AbstractState::from(ValueState::new(next))
        };
        if let Some(n) = edge.label.strip_prefix("add ") {
            let n: u8 = n
                .trim()
                .parse()
                .map_err(|_| MpaError::transfer(format!("bad label {}", edge.label)))?;
            return Ok(vec![with(n)]);
        }
        Ok(match edge.label.as_str() {
            "fork" => vec![with(100), with(101)],
            "kill" => Vec::new(),
            _ => vec![state.clone()],
        })
    }
}

pub(crate) struct SetReducer;

impl Reducer for SetReducer {
    fn reduced_state(&self, expanded: &AbstractState, _block: &Block) -> Result<AbstractState> {
        Ok(expanded.clone())
    }

    fn expanded_state(
        &self,
        _root: &AbstractState,
        _block: &Block,
        reduced: &AbstractState,
    ) -> Result<AbstractState> {
        Ok(reduced.clone())
    }

    fn reduced_precision(&self, precision: &Precision, _block: &Block) -> Result<Precision> {
        Ok(precision.clone())
    }

    fn expanded_precision(
        &self,
        _root_precision: &Precision,
        _block: &Block,
        reduced_precision: &Precision,
    ) -> Result<Precision> {
        Ok(reduced_precision.clone())
    }

    fn state_key(&self, state: &AbstractState, _precision: &Precision, _block: &Block) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }
}

/// Signals `Break` for every state
pub(crate) struct BreakingAdjustment;

impl SimplePrecisionAdjustment for BreakingAdjustment {
    fn prec(&self, _state: &AbstractState, _precision: &Precision) -> Result<Action> {
        Ok(Action::Break)
    }
}

pub(crate) struct SetAnalysis {
    merge: Arc<dyn MergeOperator>,
    adjustment: PrecisionAdjustmentOp,
    reducer: bool,
    initial: Vec<u8>,
}

impl SetAnalysis {
    /// Merges by union
    pub(crate) fn joining() -> Self {
        Self {
            merge: Arc::new(MergeJoinOperator::new(Arc::new(SetDomain))),
            adjustment: PrecisionAdjustmentOp::Simple(Arc::new(StaticPrecisionAdjustment)),
            reducer: false,
            initial: Vec::new(),
        }
    }

    /// Never merges
    pub(crate) fn separate() -> Self {
        Self {
            merge: Arc::new(MergeSepOperator),
            ..Self::joining()
        }
    }

    pub(crate) fn with_reducer(mut self) -> Self {
        self.reducer = true;
        self
    }

    pub(crate) fn with_adjustment(mut self, adjustment: PrecisionAdjustmentOp) -> Self {
        self.adjustment = adjustment;
        self
    }

    pub(crate) fn with_initial(mut self, items: &[u8]) -> Self {
        self.initial = items.to_vec();
        self
    }
}

impl ConfigurableProgramAnalysis for SetAnalysis {
    fn name(&self) -> &str {
        "SetAnalysis"
    }

    fn abstract_domain(&self) -> Arc<dyn AbstractDomain> {
        Arc::new(SetDomain)
    }

    fn transfer_relation(&self) -> Arc<dyn TransferRelation> {
        Arc::new(SetTransfer)
    }

    fn merge_operator(&self) -> Arc<dyn MergeOperator> {
        self.merge.clone()
    }

    fn stop_operator(&self) -> Arc<dyn StopOperator> {
        Arc::new(StopSepOperator::new(Arc::new(SetDomain)))
    }

    fn precision_adjustment(&self) -> PrecisionAdjustmentOp {
        self.adjustment.clone()
    }

    fn reducer(&self) -> Option<Arc<dyn Reducer>> {
        if self.reducer {
            Some(Arc::new(SetReducer))
        } else {
            None
        }
    }

    fn initial_state(&self, _node: NodeId) -> Result<AbstractState> {
        Ok(set_state(&self.initial))
    }

    fn initial_precision(&self, _node: NodeId) -> Result<Precision> {
        Ok(Precision::Static)
    }
}
