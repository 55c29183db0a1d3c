//! Product lattice: join and order are positional

use std::sync::Arc;

use crate::errors::Result;
use crate::features::composite::domain::CompositeState;
use crate::features::cpa::domain::AbstractState;
use crate::features::cpa::ports::AbstractDomain;

use super::state_components;

pub struct CompositeDomain {
    domains: Vec<Arc<dyn AbstractDomain>>,
}

impl CompositeDomain {
    pub fn new(domains: Vec<Arc<dyn AbstractDomain>>) -> Self {
        Self { domains }
    }
}

impl AbstractDomain for CompositeDomain {
    fn join(&self, state1: &AbstractState, state2: &AbstractState) -> Result<AbstractState> {
        let a = state_components(state1, self.domains.len())?;
        let b = state_components(state2, self.domains.len())?;
        let joined = self
            .domains
            .iter()
            .zip(a.iter().zip(b))
            .map(|(domain, (x, y))| domain.join(x, y))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositeState::new(joined).into())
    }

    fn is_less_or_equal(&self, state1: &AbstractState, state2: &AbstractState) -> Result<bool> {
        let a = state_components(state1, self.domains.len())?;
        let b = state_components(state2, self.domains.len())?;
        for (domain, (x, y)) in self.domains.iter().zip(a.iter().zip(b)) {
            if !domain.is_less_or_equal(x, y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
