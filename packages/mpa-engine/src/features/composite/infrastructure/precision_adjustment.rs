/*
 * Composite Precision Adjustment
 *
 * Simple: every component only decides an action; the product action is
 * the strongest one.
 * Full: each component adjusts its projection of the state in turn. A
 * component returning `None` drops the whole state; `Break` from any
 * component wins over `Continue`.
 */

use std::sync::Arc;

use crate::errors::Result;
use crate::features::composite::domain::{CompositePrecision, CompositeState};
use crate::features::cpa::domain::{AbstractState, Action, Precision, PrecisionAdjustmentResult};
use crate::features::cpa::ports::{
    PrecisionAdjustment, PrecisionAdjustmentOp, SimplePrecisionAdjustment,
};
use crate::features::reachability::domain::ReachedSet;

use super::{precision_components, state_components};

pub struct CompositeSimplePrecisionAdjustment {
    components: Vec<Arc<dyn SimplePrecisionAdjustment>>,
}

impl CompositeSimplePrecisionAdjustment {
    pub fn new(components: Vec<Arc<dyn SimplePrecisionAdjustment>>) -> Self {
        Self { components }
    }
}

impl SimplePrecisionAdjustment for CompositeSimplePrecisionAdjustment {
    fn prec(&self, state: &AbstractState, precision: &Precision) -> Result<Action> {
        let arity = self.components.len();
        let states = state_components(state, arity)?;
        let precisions = precision_components(precision, arity)?;

        let mut action = Action::Continue;
        for i in 0..arity {
            action = action.combine(self.components[i].prec(&states[i], &precisions[i])?);
        }
        Ok(action)
    }
}

pub struct CompositePrecisionAdjustment {
    components: Vec<PrecisionAdjustmentOp>,
}

impl CompositePrecisionAdjustment {
    pub fn new(components: Vec<PrecisionAdjustmentOp>) -> Self {
        Self { components }
    }
}

impl PrecisionAdjustment for CompositePrecisionAdjustment {
    fn prec(
        &self,
        state: &AbstractState,
        precision: &Precision,
        reached: &ReachedSet,
        full_state: &AbstractState,
    ) -> Result<Option<PrecisionAdjustmentResult>> {
        let arity = self.components.len();
        let states = state_components(state, arity)?;
        let precisions = precision_components(precision, arity)?;

        let mut new_states = Vec::with_capacity(arity);
        let mut new_precisions = Vec::with_capacity(arity);
        let mut action = Action::Continue;
        let mut state_changed = false;
        let mut precision_changed = false;

        for i in 0..arity {
            let result = match self.components[i].apply(&states[i], &precisions[i], reached, full_state)? {
                Some(result) => result,
                None => return Ok(None),
            };
            action = action.combine(result.action);
            state_changed |= result.state_changed;
            precision_changed |= result.precision != precisions[i];
            new_states.push(result.state);
            new_precisions.push(result.precision);
        }

        let adjusted_state = if state_changed {
            CompositeState::new(new_states).into()
        } else {
            state.clone()
        };
        let adjusted_precision = if precision_changed {
            CompositePrecision::new(new_precisions).into()
        } else {
            precision.clone()
        };

        let result = if state_changed {
            PrecisionAdjustmentResult::changed(adjusted_state, adjusted_precision)
        } else {
            PrecisionAdjustmentResult::unchanged(adjusted_state, adjusted_precision)
        };
        Ok(Some(result.with_action(action)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automaton::application::AutomatonPrecisionAdjustment;
    use crate::features::automaton::domain::{
        Automaton, AutomatonPrecision, AutomatonState, EdgeMatcher, StateKind, TransitionSpec,
    };
    use crate::features::cpa::infrastructure::testing::{set_state, BreakingAdjustment};
    use crate::features::cpa::infrastructure::StaticPrecisionAdjustment;
    use crate::shared::models::property_set;

    struct Dropping;

    impl PrecisionAdjustment for Dropping {
        fn prec(
            &self,
            _state: &AbstractState,
            _precision: &Precision,
            _reached: &ReachedSet,
            _full_state: &AbstractState,
        ) -> Result<Option<PrecisionAdjustmentResult>> {
            Ok(None)
        }
    }

    fn automaton_state() -> AutomatonState {
        let automaton = Automaton::builder("A")
            .state("Q", StateKind::Normal)
            .state("E", StateKind::Target)
            .initial("Q")
            .transition(TransitionSpec::new("Q", EdgeMatcher::Any, "E").for_property("A"))
            .build()
            .unwrap();
        AutomatonState::initial(Arc::new(automaton))
    }

    fn simple(op: impl SimplePrecisionAdjustment + 'static) -> PrecisionAdjustmentOp {
        PrecisionAdjustmentOp::Simple(Arc::new(op))
    }

    #[test]
    fn test_simple_break_wins() {
        let composite = CompositeSimplePrecisionAdjustment::new(vec![
            Arc::new(StaticPrecisionAdjustment),
            Arc::new(BreakingAdjustment),
        ]);
        let state: AbstractState =
            CompositeState::new(vec![set_state(&[]), set_state(&[])]).into();
        let precision: Precision =
            CompositePrecision::new(vec![Precision::Static, Precision::Static]).into();
        assert_eq!(composite.prec(&state, &precision).unwrap(), Action::Break);
    }

    #[test]
    fn test_full_adjustment_projects_components() {
        let composite = CompositePrecisionAdjustment::new(vec![
            simple(StaticPrecisionAdjustment),
            PrecisionAdjustmentOp::Full(Arc::new(AutomatonPrecisionAdjustment::new(true))),
        ]);
        let state: AbstractState =
            CompositeState::new(vec![set_state(&[1]), automaton_state().into()]).into();
        let precision: Precision = CompositePrecision::new(vec![
            Precision::Static,
            AutomatonPrecision::with_blacklist(property_set(["A"])).into(),
        ])
        .into();

        let result = composite
            .prec(&state, &precision, &ReachedSet::default(), &state)
            .unwrap()
            .unwrap();
        assert!(result.state_changed);
        assert_eq!(result.action, Action::Continue);
        assert_eq!(result.precision, precision);
        let adjusted = result.state.as_composite().unwrap();
        assert_eq!(adjusted.get(0), Some(&set_state(&[1])));
        assert!(adjusted
            .get(1)
            .and_then(|s| s.as_automaton())
            .unwrap()
            .relevant_transitions()
            .is_empty());
    }

    #[test]
    fn test_full_unchanged_reuses_input() {
        let composite = CompositePrecisionAdjustment::new(vec![
            simple(StaticPrecisionAdjustment),
            simple(BreakingAdjustment),
        ]);
        let state: AbstractState =
            CompositeState::new(vec![set_state(&[1]), set_state(&[2])]).into();
        let precision: Precision =
            CompositePrecision::new(vec![Precision::Static, Precision::Static]).into();

        let result = composite
            .prec(&state, &precision, &ReachedSet::default(), &state)
            .unwrap()
            .unwrap();
        assert!(!result.state_changed);
        assert_eq!(result.state, state);
        assert_eq!(result.action, Action::Break);
    }

    #[test]
    fn test_none_drops_state() {
        let composite = CompositePrecisionAdjustment::new(vec![
            simple(StaticPrecisionAdjustment),
            PrecisionAdjustmentOp::Full(Arc::new(Dropping)),
        ]);
        let state: AbstractState =
            CompositeState::new(vec![set_state(&[1]), set_state(&[2])]).into();
        let precision: Precision =
            CompositePrecision::new(vec![Precision::Static, Precision::Static]).into();
        assert!(composite
            .prec(&state, &precision, &ReachedSet::default(), &state)
            .unwrap()
            .is_none());
    }
}
