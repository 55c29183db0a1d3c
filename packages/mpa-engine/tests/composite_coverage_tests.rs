//! Coverage and memoization properties of the analysis building blocks
//!
//! - Coverage soundness: a composite state is covered iff every component is
//! - Memo idempotence: relevant-transition lookups give the same value on a
//!   cache hit as on the miss that filled the cache

mod common;

use std::sync::Arc;

use common::*;
use petgraph::graph::NodeIndex;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use mpa_engine::config::{AutomatonConfig, CompositeConfig};
use mpa_engine::features::automaton::application::AutomatonPrecisionAdjustment;
use mpa_engine::features::automaton::domain::{AutomatonPrecision, AutomatonState};
use mpa_engine::features::cpa::{
    LocationState, MergeSepOperator, SimplePrecisionAdjustment, StaticPrecisionAdjustment,
    StopSepOperator, ValueState,
};
use mpa_engine::features::mpa::domain::new_stats_handle;
use mpa_engine::{
    property_set, AbstractDomain, AbstractState, Automaton, AutomatonAnalysis, CfaEdge,
    CompositeAnalysis, CompositeState, ConfigurableProgramAnalysis, LocationAnalysis,
    LockAutomaton, MergeOperator, NodeId, Precision, PrecisionAdjustmentOp, PropertySet, Result,
    StopOperator, TransferRelation,
};

// ============================================================================
// An ordered component: upper bound of a counter
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Bound(u32);

fn bound_of(state: &AbstractState) -> Option<u32> {
    match state {
        AbstractState::Value(v) => v.downcast_ref::<Bound>().map(|b| b.0),
        _ => None,
    }
}

struct BoundDomain;

impl AbstractDomain for BoundDomain {
    fn join(&self, a: &AbstractState, b: &AbstractState) -> Result<AbstractState> {
        let joined = bound_of(a).max(bound_of(b)).unwrap_or(0);
        Ok(ValueState::new(Bound(joined)).into())
    }

    fn is_less_or_equal(&self, a: &AbstractState, b: &AbstractState) -> Result<bool> {
        Ok(matches!((bound_of(a), bound_of(b)), (Some(x), Some(y)) if x <= y))
    }
}

struct KeepBound;

impl TransferRelation for KeepBound {
    fn successors_for_edge(
        &self,
        state: &AbstractState,
        _precision: &Precision,
        _edge: &CfaEdge,
    ) -> Result<Vec<AbstractState>> {
        Ok(vec![state.clone()])
    }
}

struct BoundAnalysis {
    domain: Arc<BoundDomain>,
}

impl BoundAnalysis {
    fn new() -> Self {
        Self {
            domain: Arc::new(BoundDomain),
        }
    }
}

impl ConfigurableProgramAnalysis for BoundAnalysis {
    fn name(&self) -> &str {
        "BoundAnalysis"
    }

    fn abstract_domain(&self) -> Arc<dyn AbstractDomain> {
        self.domain.clone()
    }

    fn transfer_relation(&self) -> Arc<dyn TransferRelation> {
        Arc::new(KeepBound)
    }

    fn merge_operator(&self) -> Arc<dyn MergeOperator> {
        Arc::new(MergeSepOperator)
    }

    fn stop_operator(&self) -> Arc<dyn StopOperator> {
        Arc::new(StopSepOperator::new(self.domain.clone()))
    }

    fn precision_adjustment(&self) -> PrecisionAdjustmentOp {
        let simple: Arc<dyn SimplePrecisionAdjustment> = Arc::new(StaticPrecisionAdjustment);
        PrecisionAdjustmentOp::Simple(simple)
    }

    fn initial_state(&self, _node: NodeId) -> Result<AbstractState> {
        Ok(ValueState::new(Bound(0)).into())
    }

    fn initial_precision(&self, _node: NodeId) -> Result<Precision> {
        Ok(Precision::Static)
    }
}

// ============================================================================
// Coverage soundness
// ============================================================================

struct Fixture {
    analysis: CompositeAnalysis,
    automaton: Arc<Automaton>,
    precision: Precision,
}

fn fixture() -> Fixture {
    let automaton = Arc::new(LockAutomaton::define().unwrap());
    let components: Vec<Arc<dyn ConfigurableProgramAnalysis>> = vec![
        Arc::new(LocationAnalysis::new()),
        Arc::new(AutomatonAnalysis::new(
            automaton.clone(),
            &AutomatonConfig::default(),
            new_stats_handle(),
        )),
        Arc::new(BoundAnalysis::new()),
    ];
    let analysis = CompositeAnalysis::new(components, &CompositeConfig::default()).unwrap();
    let precision = analysis.initial_precision(NodeIndex::new(0)).unwrap();
    Fixture {
        analysis,
        automaton,
        precision,
    }
}

const LOCK_STATES: [&str; 2] = ["Unlocked", "Locked"];

fn composite(fx: &Fixture, location: usize, lock_state: usize, bound: u32) -> AbstractState {
    let internal = fx.automaton.state_by_name(LOCK_STATES[lock_state]).unwrap();
    CompositeState::new(vec![
        LocationState::new(NodeIndex::new(location)).into(),
        AutomatonState::at(fx.automaton.clone(), internal, Vec::new(), PropertySet::new()).into(),
        ValueState::new(Bound(bound)).into(),
    ])
    .into()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_composite_coverage_is_componentwise(
        (l1, a1, b1) in (0usize..2, 0usize..2, 0u32..4),
        (l2, a2, b2) in (0usize..2, 0usize..2, 0u32..4),
    ) {
        let fx = fixture();
        let s1 = composite(&fx, l1, a1, b1);
        let s2 = composite(&fx, l2, a2, b2);
        let expected = l1 == l2 && a1 == a2 && b1 <= b2;

        prop_assert_eq!(fx.analysis.is_covered_by(&s1, &s2, &fx.precision).unwrap(), expected);
        let stop = fx.analysis.stop_operator();
        prop_assert_eq!(stop.stop(&s1, &[&s2], &fx.precision).unwrap(), expected);
    }
}

#[test]
fn test_one_disagreeing_component_breaks_coverage() {
    init_tracing();
    let fx = fixture();
    let smaller = composite(&fx, 1, 0, 1);
    let larger = composite(&fx, 1, 0, 3);
    assert!(fx.analysis.is_covered_by(&smaller, &larger, &fx.precision).unwrap());
    assert!(!fx.analysis.is_covered_by(&larger, &smaller, &fx.precision).unwrap());

    // location and bound agree, the automaton does not
    let locked = composite(&fx, 1, 1, 3);
    assert!(!fx.analysis.is_covered_by(&smaller, &locked, &fx.precision).unwrap());

    let stop = fx.analysis.stop_operator();
    assert!(stop
        .stop(&smaller, &[&locked, &larger], &fx.precision)
        .unwrap());
    assert!(!stop.stop(&smaller, &[&locked], &fx.precision).unwrap());
}

#[test]
fn test_components_of_different_arity_are_rejected() {
    let fx = fixture();
    let short: AbstractState =
        CompositeState::new(vec![LocationState::new(NodeIndex::new(1)).into()]).into();
    let full = composite(&fx, 1, 0, 0);
    assert!(fx.analysis.is_covered_by(&short, &full, &fx.precision).is_err());
}

// ============================================================================
// Memo idempotence
// ============================================================================

const LOCK_PROPERTIES: [&str; 2] = ["double_lock", "double_unlock"];

proptest! {
    #[test]
    fn prop_relevant_transitions_hit_equals_miss(
        lock_state in 0usize..2,
        blacklist in prop::collection::btree_set(0usize..2, 0..=2),
    ) {
        let automaton = Arc::new(LockAutomaton::define().unwrap());
        let internal = automaton.state_by_name(LOCK_STATES[lock_state]).unwrap();
        let state = AutomatonState::at(automaton, internal, Vec::new(), PropertySet::new());
        let precision = AutomatonPrecision::with_blacklist(property_set(
            blacklist.iter().map(|i| LOCK_PROPERTIES[*i]),
        ));

        let adjustment = AutomatonPrecisionAdjustment::new(true);
        let miss = adjustment.relevant_transitions(&state, &precision);
        let hit = adjustment.relevant_transitions(&state, &precision);
        prop_assert_eq!(&miss[..], &hit[..]);
        prop_assert_eq!(adjustment.cache_stats(), (1, 1));
        prop_assert_eq!(adjustment.cache_len(), 1);

        let fresh = AutomatonPrecisionAdjustment::new(true);
        prop_assert_eq!(&fresh.relevant_transitions(&state, &precision)[..], &miss[..]);
    }
}

#[test]
fn test_blacklisting_shrinks_relevant_transitions() {
    let automaton = Arc::new(LockAutomaton::define().unwrap());
    let state = AutomatonState::initial(automaton);
    let adjustment = AutomatonPrecisionAdjustment::new(true);

    let all = adjustment.relevant_transitions(&state, &AutomatonPrecision::initial());
    let fewer = adjustment.relevant_transitions(
        &state,
        &AutomatonPrecision::with_blacklist(property_set(["double_unlock"])),
    );

    assert_eq!(all.len(), 2);
    assert_eq!(fewer.len(), 1);
    assert_eq!(adjustment.cache_len(), 2);

    adjustment.clear_cache();
    assert_eq!(adjustment.cache_len(), 0);
    let again = adjustment.relevant_transitions(&state, &AutomatonPrecision::initial());
    assert_eq!(&again[..], &all[..]);
}
