/*
 * Composite Merge Operators
 *
 * - Agree: merge every component; give up (return `reached`) as soon as a
 *   component's merge result does not cover the component successor, i.e.
 *   the component refused to merge. Proof mode additionally never merges
 *   target states and requires each merged component to be above the
 *   reached one.
 * - Plain: merge every component independently.
 *
 * Both return `reached` itself when no component changed.
 * The all-sep fast path is `MergeSepOperator` and is chosen by the analysis.
 */

use std::sync::Arc;

use crate::errors::Result;
use crate::features::composite::domain::CompositeState;
use crate::features::cpa::domain::{AbstractState, Precision};
use crate::features::cpa::ports::{AbstractDomain, MergeOperator, StopOperator};

use super::{precision_components, state_components};

pub struct CompositeMergeAgreeOperator {
    merges: Vec<Arc<dyn MergeOperator>>,
    stops: Vec<Arc<dyn StopOperator>>,
    domains: Vec<Arc<dyn AbstractDomain>>,
    proof_mode: bool,
}

impl CompositeMergeAgreeOperator {
    pub fn new(
        merges: Vec<Arc<dyn MergeOperator>>,
        stops: Vec<Arc<dyn StopOperator>>,
        domains: Vec<Arc<dyn AbstractDomain>>,
    ) -> Self {
        Self {
            merges,
            stops,
            domains,
            proof_mode: false,
        }
    }

    pub fn in_proof_mode(mut self) -> Self {
        self.proof_mode = true;
        self
    }

    pub fn is_proof_mode(&self) -> bool {
        self.proof_mode
    }
}

impl MergeOperator for CompositeMergeAgreeOperator {
    fn merge(
        &self,
        successor: &AbstractState,
        reached: &AbstractState,
        precision: &Precision,
    ) -> Result<AbstractState> {
        let arity = self.merges.len();
        let succ = state_components(successor, arity)?;
        let prev = state_components(reached, arity)?;
        let precisions = precision_components(precision, arity)?;

        if self.proof_mode && (successor.is_target() || reached.is_target()) {
            return Ok(reached.clone());
        }

        let mut merged = Vec::with_capacity(arity);
        let mut identical = true;
        for i in 0..arity {
            let m = self.merges[i].merge(&succ[i], &prev[i], &precisions[i])?;
            if !self.stops[i].stop(&succ[i], &[&m], &precisions[i])? {
                return Ok(reached.clone());
            }
            if self.proof_mode && !self.domains[i].is_less_or_equal(&prev[i], &m)? {
                return Ok(reached.clone());
            }
            identical &= m == prev[i];
            merged.push(m);
        }

        if identical {
            return Ok(reached.clone());
        }
        Ok(CompositeState::new(merged).into())
    }
}

pub struct CompositeMergePlainOperator {
    merges: Vec<Arc<dyn MergeOperator>>,
}

impl CompositeMergePlainOperator {
    pub fn new(merges: Vec<Arc<dyn MergeOperator>>) -> Self {
        Self { merges }
    }
}

impl MergeOperator for CompositeMergePlainOperator {
    fn merge(
        &self,
        successor: &AbstractState,
        reached: &AbstractState,
        precision: &Precision,
    ) -> Result<AbstractState> {
        let arity = self.merges.len();
        let succ = state_components(successor, arity)?;
        let prev = state_components(reached, arity)?;
        let precisions = precision_components(precision, arity)?;

        let mut merged = Vec::with_capacity(arity);
        let mut identical = true;
        for i in 0..arity {
            let m = self.merges[i].merge(&succ[i], &prev[i], &precisions[i])?;
            identical &= m == prev[i];
            merged.push(m);
        }

        if identical {
            return Ok(reached.clone());
        }
        Ok(CompositeState::new(merged).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::composite::domain::CompositePrecision;
    use crate::features::cpa::infrastructure::testing::{set_state, SetDomain};
    use crate::features::cpa::infrastructure::{
        EqualityDomain, MergeJoinOperator, MergeSepOperator, StopSepOperator,
    };

    fn tuple(a: &[u8], b: &[u8]) -> AbstractState {
        CompositeState::new(vec![set_state(a), set_state(b)]).into()
    }

    fn precision() -> Precision {
        CompositePrecision::new(vec![Precision::Static, Precision::Static]).into()
    }

    fn join() -> Arc<dyn MergeOperator> {
        Arc::new(MergeJoinOperator::new(Arc::new(SetDomain)))
    }

    fn set_stop() -> Arc<dyn StopOperator> {
        Arc::new(StopSepOperator::new(Arc::new(SetDomain)))
    }

    fn agree(second: Arc<dyn MergeOperator>) -> CompositeMergeAgreeOperator {
        CompositeMergeAgreeOperator::new(
            vec![join(), second],
            vec![set_stop(), set_stop()],
            vec![Arc::new(SetDomain), Arc::new(SetDomain)],
        )
    }

    #[test]
    fn test_agree_merges_when_all_components_merge() {
        let merged = agree(join())
            .merge(&tuple(&[1], &[2]), &tuple(&[3], &[4]), &precision())
            .unwrap();
        assert_eq!(merged, tuple(&[1, 3], &[2, 4]));
    }

    #[test]
    fn test_agree_refuses_when_one_component_separates() {
        let reached = tuple(&[3], &[4]);
        let merged = agree(Arc::new(MergeSepOperator))
            .merge(&tuple(&[1], &[2]), &reached, &precision())
            .unwrap();
        assert_eq!(merged, reached);
    }

    #[test]
    fn test_agree_accepts_sep_component_that_already_covers() {
        // The sep component returns `reached`, which covers the successor.
        let merged = agree(Arc::new(MergeSepOperator))
            .merge(&tuple(&[1], &[4]), &tuple(&[3], &[4]), &precision())
            .unwrap();
        assert_eq!(merged, tuple(&[1, 3], &[4]));
    }

    #[test]
    fn test_identical_merge_returns_reached() {
        let reached = tuple(&[1, 2], &[3]);
        let merged = agree(join())
            .merge(&tuple(&[1], &[3]), &reached, &precision())
            .unwrap();
        assert_eq!(merged, reached);
    }

    #[test]
    fn test_plain_merges_independently() {
        let plain = CompositeMergePlainOperator::new(vec![join(), Arc::new(MergeSepOperator)]);
        let merged = plain
            .merge(&tuple(&[1], &[2]), &tuple(&[3], &[4]), &precision())
            .unwrap();
        assert_eq!(merged, tuple(&[1, 3], &[4]));
    }

    #[test]
    fn test_proof_mode_never_merges_targets() {
        use crate::features::automaton::domain::{
            Automaton, AutomatonState, EdgeMatcher, StateKind, TransitionSpec,
        };

        let automaton = Arc::new(
            Automaton::builder("A")
                .state("Q", StateKind::Normal)
                .state("E", StateKind::Target)
                .initial("Q")
                .transition(TransitionSpec::new("Q", EdgeMatcher::Any, "E"))
                .build()
                .unwrap(),
        );
        let error = AutomatonState::at(
            automaton.clone(),
            automaton.state_by_name("E").unwrap(),
            vec![],
            crate::shared::models::property_set(["A"]),
        );
        let with_target = |items: &[u8]| -> AbstractState {
            CompositeState::new(vec![set_state(items), error.clone().into()]).into()
        };

        let operator = CompositeMergeAgreeOperator::new(
            vec![join(), Arc::new(MergeSepOperator)],
            vec![
                set_stop(),
                Arc::new(StopSepOperator::new(Arc::new(EqualityDomain))),
            ],
            vec![Arc::new(SetDomain), Arc::new(EqualityDomain)],
        )
        .in_proof_mode();
        assert!(operator.is_proof_mode());

        let reached = with_target(&[2]);
        let merged = operator
            .merge(&with_target(&[1]), &reached, &precision())
            .unwrap();
        assert_eq!(merged, reached);
    }
}
