//! Composite coverage: covered iff every component is covered, checked in
//! component order with short-circuit on the first failure.

use std::sync::Arc;

use crate::errors::Result;
use crate::features::cpa::domain::{AbstractState, Precision};
use crate::features::cpa::ports::StopOperator;

use super::{precision_components, state_components};

pub struct CompositeStopOperator {
    stops: Vec<Arc<dyn StopOperator>>,
}

impl CompositeStopOperator {
    pub fn new(stops: Vec<Arc<dyn StopOperator>>) -> Self {
        Self { stops }
    }

    /// `state` covered by `other` component-wise
    pub fn is_covered_by(
        &self,
        state: &AbstractState,
        other: &AbstractState,
        precision: &Precision,
    ) -> Result<bool> {
        let arity = self.stops.len();
        let a = state_components(state, arity)?;
        let b = state_components(other, arity)?;
        let precisions = precision_components(precision, arity)?;
        for i in 0..arity {
            if !self.stops[i].stop(&a[i], &[&b[i]], &precisions[i])? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl StopOperator for CompositeStopOperator {
    fn stop(
        &self,
        state: &AbstractState,
        reached: &[&AbstractState],
        precision: &Precision,
    ) -> Result<bool> {
        for other in reached {
            if self.is_covered_by(state, other, precision)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
