/*
 * Automaton Transfer Relation
 *
 * Advances one property automaton along a CFA edge:
 * - bottom has no successors
 * - an automaton whose properties are all blacklisted parks in an
 *   inactive state; once a property is un-blacklisted it restarts from the
 *   initial state and takes the current edge from there
 * - every matching relevant transition yields a successor
 *   (nondeterministic automata yield several)
 * - no match: the automaton stays where it is, assumptions dropped
 *
 * Target hits are reported to the run statistics; a property whose budget
 * is exhausted is disabled and its hit is not reported.
 */

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::errors::{MpaError, Result};
use crate::features::automaton::domain::{
    Automaton, AutomatonPrecision, AutomatonState, AutomatonTransition, StateKind,
};
use crate::features::cpa::domain::{AbstractState, Precision};
use crate::features::cpa::ports::TransferRelation;
use crate::features::mpa::domain::StatsHandle;
use crate::features::mpa::ports::PropertyBudgeting;
use crate::shared::models::{CfaEdge, PropertySet};

/// Replaceable property-budgeting policy shared by the operators of one
/// analysis; empty means no property is ever exhausted.
pub type BudgetingSlot = Arc<RwLock<Option<Arc<dyn PropertyBudgeting>>>>;

pub fn new_budgeting_slot() -> BudgetingSlot {
    Arc::new(RwLock::new(None))
}

/// Automaton precision carried by `precision`; the static precision stands
/// for "nothing blacklisted".
pub(crate) fn automaton_precision(precision: &Precision) -> Result<AutomatonPrecision> {
    match precision {
        Precision::Automaton(p) => Ok(p.clone()),
        Precision::Static => Ok(AutomatonPrecision::initial()),
        _ => Err(MpaError::transfer(
            "automaton analysis received a non-automaton precision",
        )),
    }
}

pub struct AutomatonTransferRelation {
    automaton: Arc<Automaton>,
    stats: StatsHandle,
    budgeting: BudgetingSlot,
}

impl AutomatonTransferRelation {
    pub fn new(automaton: Arc<Automaton>, stats: StatsHandle, budgeting: BudgetingSlot) -> Self {
        Self {
            automaton,
            stats,
            budgeting,
        }
    }

    pub fn automaton(&self) -> &Arc<Automaton> {
        &self.automaton
    }

    /// Successors of a single automaton state
    pub fn successors_of(
        &self,
        state: &AutomatonState,
        precision: &AutomatonPrecision,
        edge: &CfaEdge,
    ) -> Vec<AutomatonState> {
        if state.is_bottom() {
            return Vec::new();
        }

        let automaton = &self.automaton;
        let all_blacklisted = precision.are_blacklisted(automaton.properties());

        if all_blacklisted {
            if state.is_inactive() {
                return vec![state.without_assumptions()];
            }
            let parked = if state.internal_state() == automaton.initial_state() {
                automaton.inactive_state()
            } else {
                automaton.intermediate_inactive_state()
            };
            return vec![AutomatonState::at(
                automaton.clone(),
                parked,
                Vec::new(),
                PropertySet::new(),
            )];
        }

        if state.kind() == StateKind::Inactive {
            debug!(automaton = %automaton, "reactivating automaton");
            let restarted = AutomatonState::initial(automaton.clone());
            return self.successors_of(&restarted, precision, edge);
        }

        // A reported target whose properties are all blacklisted has done its job.
        if state.is_target() {
            if let Ok(violated) = state.violated_properties() {
                if precision.are_blacklisted(&violated) {
                    return vec![AutomatonState::at(
                        automaton.clone(),
                        automaton.intermediate_inactive_state(),
                        Vec::new(),
                        PropertySet::new(),
                    )];
                }
            }
        }

        let mut successors: Vec<AutomatonState> = Vec::new();
        for transition in state.relevant_transition_iter() {
            if !transition.matcher.matches(edge) {
                continue;
            }
            if let Some(successor) = self.fire(transition, precision) {
                if !successors.contains(&successor) {
                    successors.push(successor);
                }
            }
        }

        if successors.is_empty() {
            successors.push(state.without_assumptions());
        }
        successors
    }

    fn fire(
        &self,
        transition: &AutomatonTransition,
        precision: &AutomatonPrecision,
    ) -> Option<AutomatonState> {
        let automaton = &self.automaton;
        let properties = if transition.properties.is_empty() {
            automaton.properties()
        } else {
            &transition.properties
        };

        let mut stats = self.stats.lock();
        stats.signal_relevant_transition(properties);

        let mut violated = PropertySet::new();
        if automaton.state(transition.follow).kind == StateKind::Target {
            let budgeting = self.budgeting.read().clone();
            for property in properties {
                if precision.is_blacklisted(property) || stats.disabled().contains(property) {
                    continue;
                }
                stats.signal_target_hit(property);
                if budgeting
                    .as_ref()
                    .map_or(false, |b| b.is_exhausted(property, &stats))
                {
                    debug!(property = %property, "property budget exhausted");
                    stats.disable(property.clone());
                } else {
                    violated.insert(property.clone());
                }
            }
            if violated.is_empty() {
                return None;
            }
        }

        Some(AutomatonState::at(
            automaton.clone(),
            transition.follow,
            transition.assumptions.clone(),
            violated,
        ))
    }
}

impl TransferRelation for AutomatonTransferRelation {
    fn successors_for_edge(
        &self,
        state: &AbstractState,
        precision: &Precision,
        edge: &CfaEdge,
    ) -> Result<Vec<AbstractState>> {
        let state = state.as_automaton().ok_or_else(|| {
            MpaError::transfer(format!(
                "automaton transfer received a {} state",
                state.kind_name()
            ))
        })?;
        let precision = automaton_precision(precision)?;
        Ok(self
            .successors_of(state, &precision, edge)
            .into_iter()
            .map(AbstractState::from)
            .collect())
    }
}
