//! Control-automaton analysis: one property automaton as a component analysis

use std::sync::Arc;

use tracing::trace;

use crate::config::AutomatonConfig;
use crate::errors::Result;
use crate::features::automaton::domain::{Automaton, AutomatonPrecision, AutomatonState};
use crate::features::cpa::domain::{AbstractState, Precision};
use crate::features::cpa::infrastructure::{EqualityDomain, MergeSepOperator, StopSepOperator};
use crate::features::cpa::ports::{
    AbstractDomain, ConfigurableProgramAnalysis, MergeOperator, PrecisionAdjustmentOp,
    StopOperator, TransferRelation,
};
use crate::features::mpa::domain::StatsHandle;
use crate::features::mpa::ports::PropertyBudgeting;
use crate::shared::models::{NodeId, PropertySet};

use super::precision_adjustment::AutomatonPrecisionAdjustment;
use super::transfer::{new_budgeting_slot, AutomatonTransferRelation, BudgetingSlot};

pub struct AutomatonAnalysis {
    name: String,
    automaton: Arc<Automaton>,
    domain: Arc<EqualityDomain>,
    transfer: Arc<AutomatonTransferRelation>,
    merge: Arc<MergeSepOperator>,
    stop: Arc<StopSepOperator>,
    adjustment: Arc<AutomatonPrecisionAdjustment>,
    budgeting: BudgetingSlot,
}

impl AutomatonAnalysis {
    pub fn new(automaton: Arc<Automaton>, config: &AutomatonConfig, stats: StatsHandle) -> Self {
        let budgeting = new_budgeting_slot();
        let domain = Arc::new(EqualityDomain);
        Self {
            name: format!("AutomatonAnalysis[{}]", automaton.name()),
            transfer: Arc::new(AutomatonTransferRelation::new(
                automaton.clone(),
                stats,
                budgeting.clone(),
            )),
            merge: Arc::new(MergeSepOperator),
            stop: Arc::new(StopSepOperator::new(domain.clone())),
            adjustment: Arc::new(AutomatonPrecisionAdjustment::new(config.adjust_transitions)),
            domain,
            automaton,
            budgeting,
        }
    }

    pub fn automaton(&self) -> &Arc<Automaton> {
        &self.automaton
    }

    pub fn adjustment(&self) -> &Arc<AutomatonPrecisionAdjustment> {
        &self.adjustment
    }
}

impl ConfigurableProgramAnalysis for AutomatonAnalysis {
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
        PrecisionAdjustmentOp::Full(self.adjustment.clone())
    }

    fn initial_state(&self, _node: NodeId) -> Result<AbstractState> {
        Ok(AutomatonState::initial(self.automaton.clone()).into())
    }

    fn initial_precision(&self, _node: NodeId) -> Result<Precision> {
        Ok(AutomatonPrecision::initial().into())
    }

    fn encoded_properties(&self) -> PropertySet {
        self.automaton.properties().clone()
    }

    fn clear_caches(&self) {
        trace!(automaton = %self.automaton, "clearing transition memo");
        self.adjustment.clear_cache();
    }

    fn set_property_budgeting(&self, budgeting: Arc<dyn PropertyBudgeting>) {
        *self.budgeting.write() = Some(budgeting);
    }
}
