//! Stock operators shared by the built-in analyses

use std::sync::Arc;

use crate::errors::{MpaError, Result};
use crate::features::cpa::domain::{AbstractState, Action, Precision};
use crate::features::cpa::ports::{
    AbstractDomain, MergeOperator, SimplePrecisionAdjustment, StopOperator,
};

/// Flat domain: a state is only below itself
#[derive(Debug, Default)]
pub struct EqualityDomain;

impl AbstractDomain for EqualityDomain {
    fn join(&self, state1: &AbstractState, state2: &AbstractState) -> Result<AbstractState> {
        if state1 == state2 {
            Ok(state2.clone())
        } else {
            Err(MpaError::unsupported(format!(
                "join of distinct {} states",
                state1.kind_name()
            )))
        }
    }

    fn is_less_or_equal(&self, state1: &AbstractState, state2: &AbstractState) -> Result<bool> {
        Ok(state1 == state2)
    }
}

/// Never merges
#[derive(Debug, Default)]
pub struct MergeSepOperator;

impl MergeOperator for MergeSepOperator {
    fn merge(
        &self,
        _successor: &AbstractState,
        reached: &AbstractState,
        _precision: &Precision,
    ) -> Result<AbstractState> {
        Ok(reached.clone())
    }

    fn is_sep(&self) -> bool {
        true
    }
}

/// Merges with the domain join
pub struct MergeJoinOperator {
    domain: Arc<dyn AbstractDomain>,
}

impl MergeJoinOperator {
    pub fn new(domain: Arc<dyn AbstractDomain>) -> Self {
        Self { domain }
    }
}

impl MergeOperator for MergeJoinOperator {
    fn merge(
        &self,
        successor: &AbstractState,
        reached: &AbstractState,
        _precision: &Precision,
    ) -> Result<AbstractState> {
        self.domain.join(successor, reached)
    }
}

/// Covered if below any single reached state
pub struct StopSepOperator {
    domain: Arc<dyn AbstractDomain>,
}

impl StopSepOperator {
    pub fn new(domain: Arc<dyn AbstractDomain>) -> Self {
        Self { domain }
    }
}

impl StopOperator for StopSepOperator {
    fn stop(
        &self,
        state: &AbstractState,
        reached: &[&AbstractState],
        _precision: &Precision,
    ) -> Result<bool> {
        for other in reached {
            if self.domain.is_less_or_equal(state, other)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Precision adjustment that never changes anything
#[derive(Debug, Default)]
pub struct StaticPrecisionAdjustment;

impl SimplePrecisionAdjustment for StaticPrecisionAdjustment {
    fn prec(&self, _state: &AbstractState, _precision: &Precision) -> Result<Action> {
        Ok(Action::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cpa::domain::LocationState;
    use petgraph::graph::NodeIndex;

    fn loc(n: usize) -> AbstractState {
        LocationState::new(NodeIndex::new(n)).into()
    }

    #[test]
    fn test_equality_domain() {
        let domain = EqualityDomain;
        assert!(domain.is_less_or_equal(&loc(1), &loc(1)).unwrap());
        assert!(!domain.is_less_or_equal(&loc(1), &loc(2)).unwrap());
        assert_eq!(domain.join(&loc(1), &loc(1)).unwrap(), loc(1));
        assert!(domain.join(&loc(1), &loc(2)).is_err());
    }

    #[test]
    fn test_merge_sep_returns_reached() {
        let merged = MergeSepOperator
            .merge(&loc(1), &loc(2), &Precision::Static)
            .unwrap();
        assert_eq!(merged, loc(2));
        assert!(MergeSepOperator.is_sep());
    }

    #[test]
    fn test_stop_sep() {
        let stop = StopSepOperator::new(Arc::new(EqualityDomain));
        let a = loc(1);
        let b = loc(2);
        assert!(stop.stop(&a, &[&b, &a], &Precision::Static).unwrap());
        assert!(!stop.stop(&a, &[&b], &Precision::Static).unwrap());
        assert!(!stop.stop(&a, &[], &Precision::Static).unwrap());
    }
}
