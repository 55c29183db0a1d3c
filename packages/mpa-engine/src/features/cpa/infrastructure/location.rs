/*
 * Location Analysis
 *
 * Tracks the program counter. Its transfer relation follows the CFA edge
 * if the edge leaves the current location and yields nothing otherwise,
 * which is what makes the driver's per-edge loop sound for every other
 * component.
 */

use std::sync::Arc;

use crate::errors::Result;
use crate::features::cpa::domain::{AbstractState, LocationState, Precision};
use crate::features::cpa::ports::{
    AbstractDomain, ConfigurableProgramAnalysis, MergeOperator, PrecisionAdjustmentOp,
    StopOperator, TransferRelation,
};
use crate::shared::models::{CfaEdge, NodeId};

use super::operators::{EqualityDomain, MergeSepOperator, StaticPrecisionAdjustment, StopSepOperator};

#[derive(Debug, Default)]
pub struct LocationTransferRelation;

impl TransferRelation for LocationTransferRelation {
    fn successors_for_edge(
        &self,
        state: &AbstractState,
        _precision: &Precision,
        edge: &CfaEdge,
    ) -> Result<Vec<AbstractState>> {
        match state {
            AbstractState::Location(l) if l.node == edge.source => {
                Ok(vec![LocationState::new(edge.target).into()])
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// CFA-location component
pub struct LocationAnalysis {
    domain: Arc<dyn AbstractDomain>,
    transfer: Arc<dyn TransferRelation>,
    merge: Arc<dyn MergeOperator>,
    stop: Arc<dyn StopOperator>,
}

impl LocationAnalysis {
    pub fn new() -> Self {
        let domain: Arc<dyn AbstractDomain> = Arc::new(EqualityDomain);
        Self {
            transfer: Arc::new(LocationTransferRelation),
            merge: Arc::new(MergeSepOperator),
            stop: Arc::new(StopSepOperator::new(domain.clone())),
            domain,
        }
    }
}

impl Default for LocationAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurableProgramAnalysis for LocationAnalysis {
    fn name(&self) -> &str {
        "LocationAnalysis"
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
        PrecisionAdjustmentOp::Simple(Arc::new(StaticPrecisionAdjustment))
    }

    fn initial_state(&self, node: NodeId) -> Result<AbstractState> {
        Ok(LocationState::new(node).into())
    }

    fn initial_precision(&self, _node: NodeId) -> Result<Precision> {
        Ok(Precision::Static)
    }
}
