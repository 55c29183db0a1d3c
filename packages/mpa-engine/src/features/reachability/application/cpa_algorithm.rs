/*
 * CPA Algorithm
 *
 * Reference worklist driver:
 *   pop → for each leaving CFA edge: transfer → precision adjustment →
 *   merge with reached states at the same location → stop → add
 *
 * The interrupt flag is polled before every edge. When the driver returns
 * early (interrupt, break, target) the state being expanded is put back on
 * the waitlist so a later run can finish it.
 */

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::DriverConfig;
use crate::errors::{MpaError, Result};
use crate::features::cpa::domain::{AbstractState, Action, Precision};
use crate::features::cpa::ports::{
    ConfigurableProgramAnalysis, MergeOperator, PrecisionAdjustmentOp, StopOperator,
    TransferRelation,
};
use crate::features::reachability::domain::{ReachedSet, StateId};
use crate::features::reachability::ports::{AlgorithmStatus, ReachabilityDriver, RunOutcome};
use crate::shared::interrupt::{InterruptKind, ShutdownNotifier};
use crate::shared::models::Cfa;

enum Step {
    Continue,
    Return,
}

pub struct CpaAlgorithm {
    cfa: Arc<Cfa>,
    transfer: Arc<dyn TransferRelation>,
    merge: Arc<dyn MergeOperator>,
    stop: Arc<dyn StopOperator>,
    adjustment: PrecisionAdjustmentOp,
    config: DriverConfig,
    shutdown: ShutdownNotifier,
}

impl CpaAlgorithm {
    pub fn new(
        cfa: Arc<Cfa>,
        analysis: &dyn ConfigurableProgramAnalysis,
        config: DriverConfig,
        shutdown: ShutdownNotifier,
    ) -> Self {
        Self {
            cfa,
            transfer: analysis.transfer_relation(),
            merge: analysis.merge_operator(),
            stop: analysis.stop_operator(),
            adjustment: analysis.precision_adjustment(),
            config,
            shutdown,
        }
    }

    fn explore(&self, reached: &mut ReachedSet) -> Result<Option<RunOutcome>> {
        while let Some(id) = reached.pop_from_waitlist() {
            let (state, precision) = match (reached.state(id), reached.precision(id)) {
                (Some(s), Some(p)) => (s.clone(), p.clone()),
                _ => continue,
            };
            let location = state.location().ok_or_else(|| {
                MpaError::invalid_analysis("reached state carries no program location")
            })?;

            for edge in self.cfa.leaving_edges(location) {
                if let Some(kind) = self.shutdown.requested() {
                    reached.re_add_to_waitlist(id)?;
                    debug!(interrupt = %kind, "driver interrupted");
                    return Ok(Some(match kind {
                        InterruptKind::ResourceLimit => RunOutcome::ResourceInterrupt,
                        InterruptKind::External => RunOutcome::ExternalShutdown,
                    }));
                }

                let successors = self.transfer.successors_for_edge(&state, &precision, edge)?;
                trace!(edge = %edge, successors = successors.len(), "transfer");
                for successor in successors {
                    if let Step::Return = self.handle_successor(reached, successor, &precision)? {
                        reached.re_add_to_waitlist(id)?;
                        return Ok(None);
                    }
                }
            }
        }
        Ok(None)
    }

    fn handle_successor(
        &self,
        reached: &mut ReachedSet,
        successor: AbstractState,
        precision: &Precision,
    ) -> Result<Step> {
        let adjusted = match self
            .adjustment
            .apply(&successor, precision, reached, &successor)?
        {
            Some(adjusted) => adjusted,
            None => return Ok(Step::Continue),
        };
        let successor = adjusted.state;
        let precision = adjusted.precision;

        if adjusted.action == Action::Break {
            let covered = self.is_covered(reached, &successor, &precision)?;
            if !(covered && successor.is_target()) {
                debug!("precision adjustment requested a break");
                reached.add(successor, precision);
                return Ok(Step::Return);
            }
        }

        if !self.merge.is_sep() {
            let location = successor.location();
            let candidates: Vec<StateId> = reached.reached_at(location).to_vec();
            for id in candidates {
                let Some(existing) = reached.state(id).cloned() else {
                    continue;
                };
                let merged = self.merge.merge(&successor, &existing, &precision)?;
                if merged != existing {
                    trace!("merged successor into reached state");
                    reached.replace(id, merged, precision.clone())?;
                }
            }
        }

        if self.is_covered(reached, &successor, &precision)? {
            return Ok(Step::Continue);
        }

        let is_target = successor.is_target();
        reached.add(successor, precision);
        if is_target && self.config.stop_after_error {
            debug!("target state reached");
            return Ok(Step::Return);
        }
        Ok(Step::Continue)
    }

    fn is_covered(
        &self,
        reached: &ReachedSet,
        successor: &AbstractState,
        precision: &Precision,
    ) -> Result<bool> {
        let others: Vec<&AbstractState> = reached
            .reached_at(successor.location())
            .iter()
            .filter_map(|id| reached.state(*id))
            .collect();
        self.stop.stop(successor, &others, precision)
    }
}

impl ReachabilityDriver for CpaAlgorithm {
    fn run(&self, reached: &mut ReachedSet) -> RunOutcome {
        match self.explore(reached) {
            Ok(Some(interrupted)) => interrupted,
            Ok(None) => RunOutcome::Finished(AlgorithmStatus::sound_and_precise()),
            Err(e) => RunOutcome::Fatal(e),
        }
    }
}
