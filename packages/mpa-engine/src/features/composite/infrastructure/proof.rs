/*
 * Composite Proof Checker
 *
 * Re-derives the successors of a state through every component transfer
 * relation and checks that each derived successor is covered by one of the
 * claimed successors.
 */

use std::sync::Arc;

use crate::errors::Result;
use crate::features::composite::domain::CompositePrecision;
use crate::features::cpa::domain::{AbstractState, Precision};
use crate::features::cpa::ports::{ProofChecker, TransferRelation};
use crate::shared::models::CfaEdge;

use super::stop::CompositeStopOperator;
use super::transfer::CompositeTransferRelation;

pub struct CompositeProofChecker {
    transfer: Arc<CompositeTransferRelation>,
    stop: Arc<CompositeStopOperator>,
    arity: usize,
}

impl CompositeProofChecker {
    pub fn new(
        transfer: Arc<CompositeTransferRelation>,
        stop: Arc<CompositeStopOperator>,
        arity: usize,
    ) -> Self {
        Self {
            transfer,
            stop,
            arity,
        }
    }
}

impl ProofChecker for CompositeProofChecker {
    fn are_abstract_successors(
        &self,
        state: &AbstractState,
        precision: &Precision,
        edge: &CfaEdge,
        claimed: &[AbstractState],
    ) -> Result<bool> {
        let derived = self.transfer.successors_for_edge(state, precision, edge)?;
        'derived: for successor in &derived {
            for candidate in claimed {
                if self.stop.is_covered_by(successor, candidate, precision)? {
                    continue 'derived;
                }
            }
            return Ok(false);
        }
        Ok(true)
    }

    fn is_covered_by(&self, state: &AbstractState, other: &AbstractState) -> Result<bool> {
        let precision: Precision =
            CompositePrecision::new(vec![Precision::Static; self.arity]).into();
        self.stop.is_covered_by(state, other, &precision)
    }
}
