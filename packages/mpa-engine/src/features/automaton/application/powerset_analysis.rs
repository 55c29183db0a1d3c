/*
 * Powerset Automaton Analysis
 *
 * Tracks the set of automaton states reachable at a program location
 * instead of one state per path. Merge is set union, coverage is subset
 * inclusion; transfer and precision adjustment are lifted member-wise from
 * the single-automaton operators and share their memo table.
 */

use std::sync::Arc;

use crate::config::AutomatonConfig;
use crate::errors::{MpaError, Result};
use crate::features::automaton::domain::{
    Automaton, AutomatonPrecision, AutomatonState, PowersetAutomatonState,
};
use crate::features::cpa::domain::{AbstractState, Precision, PrecisionAdjustmentResult};
use crate::features::cpa::infrastructure::{MergeJoinOperator, StopSepOperator};
use crate::features::cpa::ports::{
    AbstractDomain, ConfigurableProgramAnalysis, MergeOperator, PrecisionAdjustment,
    PrecisionAdjustmentOp, StopOperator, TransferRelation,
};
use crate::features::mpa::domain::StatsHandle;
use crate::features::mpa::ports::PropertyBudgeting;
use crate::features::reachability::domain::ReachedSet;
use crate::shared::models::{CfaEdge, NodeId, PropertySet};

use super::precision_adjustment::AutomatonPrecisionAdjustment;
use super::transfer::{
    automaton_precision, new_budgeting_slot, AutomatonTransferRelation, BudgetingSlot,
};

fn as_powerset<'a>(state: &'a AbstractState, who: &str) -> Result<&'a PowersetAutomatonState> {
    state.as_powerset().ok_or_else(|| {
        MpaError::invalid_analysis(format!(
            "{} received a {} state",
            who,
            state.kind_name()
        ))
    })
}

/// Subset lattice over automaton-state sets
#[derive(Debug, Default)]
pub struct PowersetDomain;

impl AbstractDomain for PowersetDomain {
    fn join(&self, state1: &AbstractState, state2: &AbstractState) -> Result<AbstractState> {
        let a = as_powerset(state1, "powerset join")?;
        let b = as_powerset(state2, "powerset join")?;
        Ok(a.union(b).into())
    }

    fn is_less_or_equal(&self, state1: &AbstractState, state2: &AbstractState) -> Result<bool> {
        let a = as_powerset(state1, "powerset order")?;
        let b = as_powerset(state2, "powerset order")?;
        Ok(a.is_subset_of(b))
    }
}

pub struct PowersetTransferRelation {
    inner: Arc<AutomatonTransferRelation>,
}

impl TransferRelation for PowersetTransferRelation {
    fn successors_for_edge(
        &self,
        state: &AbstractState,
        precision: &Precision,
        edge: &CfaEdge,
    ) -> Result<Vec<AbstractState>> {
        let powerset = as_powerset(state, "powerset transfer")?;
        if powerset.is_top() {
            return Ok(vec![PowersetAutomatonState::top().into()]);
        }
        let precision = automaton_precision(precision)?;

        let members: Vec<AutomatonState> = powerset
            .iter()
            .flat_map(|member| self.inner.successors_of(member, &precision, edge))
            .collect();
        if members.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![PowersetAutomatonState::new(members).into()])
    }
}

pub struct PowersetPrecisionAdjustment {
    inner: Arc<AutomatonPrecisionAdjustment>,
}

impl PrecisionAdjustment for PowersetPrecisionAdjustment {
    fn prec(
        &self,
        state: &AbstractState,
        precision: &Precision,
        _reached: &ReachedSet,
        _full_state: &AbstractState,
    ) -> Result<Option<PrecisionAdjustmentResult>> {
        let powerset = as_powerset(state, "powerset precision adjustment")?;
        if powerset.is_top() {
            return Ok(Some(PrecisionAdjustmentResult::unchanged(
                state.clone(),
                precision.clone(),
            )));
        }
        let automaton_prec = automaton_precision(precision)?;

        let mut any_changed = false;
        let members: Vec<AutomatonState> = powerset
            .iter()
            .map(|member| {
                let (adjusted, changed) = self.inner.adjust(member, &automaton_prec);
                any_changed |= changed;
                adjusted
            })
            .collect();

        Ok(Some(if any_changed {
            PrecisionAdjustmentResult::changed(
                PowersetAutomatonState::new(members).into(),
                precision.clone(),
            )
        } else {
            PrecisionAdjustmentResult::unchanged(state.clone(), precision.clone())
        }))
    }
}

pub struct PowersetAutomatonAnalysis {
    name: String,
    automaton: Arc<Automaton>,
    domain: Arc<PowersetDomain>,
    transfer: Arc<PowersetTransferRelation>,
    merge: Arc<MergeJoinOperator>,
    stop: Arc<StopSepOperator>,
    adjustment: Arc<AutomatonPrecisionAdjustment>,
    budgeting: BudgetingSlot,
}

impl PowersetAutomatonAnalysis {
    pub fn new(automaton: Arc<Automaton>, config: &AutomatonConfig, stats: StatsHandle) -> Self {
        let budgeting = new_budgeting_slot();
        let domain = Arc::new(PowersetDomain);
        let inner = Arc::new(AutomatonTransferRelation::new(
            automaton.clone(),
            stats,
            budgeting.clone(),
        ));
        Self {
            name: format!("PowersetAutomatonAnalysis[{}]", automaton.name()),
            transfer: Arc::new(PowersetTransferRelation { inner }),
            merge: Arc::new(MergeJoinOperator::new(domain.clone())),
            stop: Arc::new(StopSepOperator::new(domain.clone())),
            adjustment: Arc::new(AutomatonPrecisionAdjustment::new(config.adjust_transitions)),
            domain,
            automaton,
            budgeting,
        }
    }

    pub fn adjustment(&self) -> &Arc<AutomatonPrecisionAdjustment> {
        &self.adjustment
    }
}

impl ConfigurableProgramAnalysis for PowersetAutomatonAnalysis {
    fn name(&self) -> &str {
        &self.name
    }

    fn abstract_domain(&self) -> Arc<dyn AbstractDomain> {
        self.domain.clone()
    }

    fn transfer_relation(&self) -> Arc<dyn TransferRelation> {
        self.transfer.clone()
    }

    fn merge_operator(&self) -> Arc<dyn MergeOperator> {
        self.merge.clone()
    }

    fn stop_operator(&self) -> Arc<dyn StopOperator> {
        self.stop.clone()
    }

    fn precision_adjustment(&self) -> PrecisionAdjustmentOp {
        PrecisionAdjustmentOp::Full(Arc::new(PowersetPrecisionAdjustment {
            inner: self.adjustment.clone(),
        }))
    }

    fn initial_state(&self, _node: NodeId) -> Result<AbstractState> {
        Ok(PowersetAutomatonState::singleton(AutomatonState::initial(self.automaton.clone())).into())
    }

    fn initial_precision(&self, _node: NodeId) -> Result<Precision> {
        Ok(AutomatonPrecision::initial().into())
    }

    fn encoded_properties(&self) -> PropertySet {
        self.automaton.properties().clone()
    }

    fn clear_caches(&self) {
        self.adjustment.clear_cache();
    }

    fn set_property_budgeting(&self, budgeting: Arc<dyn PropertyBudgeting>) {
        *self.budgeting.write() = Some(budgeting);
    }
}
