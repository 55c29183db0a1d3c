//! Component-wise reducer. Only built when every component has a reducer.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::errors::Result;
use crate::features::composite::domain::{CompositePrecision, CompositeState};
use crate::features::cpa::domain::{AbstractState, Block, Precision};
use crate::features::cpa::ports::Reducer;

use super::{precision_components, state_components};

pub struct CompositeReducer {
    reducers: Vec<Arc<dyn Reducer>>,
}

impl CompositeReducer {
    /// `None` unless every component supplied a reducer
    pub fn from_components(reducers: Vec<Option<Arc<dyn Reducer>>>) -> Option<Self> {
        let reducers: Option<Vec<Arc<dyn Reducer>>> = reducers.into_iter().collect();
        reducers.map(|reducers| Self { reducers })
    }
}

impl Reducer for CompositeReducer {
    fn reduced_state(&self, expanded: &AbstractState, block: &Block) -> Result<AbstractState> {
        let states = state_components(expanded, self.reducers.len())?;
        let reduced = self
            .reducers
            .iter()
            .zip(states)
            .map(|(reducer, state)| reducer.reduced_state(state, block))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositeState::new(reduced).into())
    }

    fn expanded_state(
        &self,
        root: &AbstractState,
        block: &Block,
        reduced: &AbstractState,
    ) -> Result<AbstractState> {
        let arity = self.reducers.len();
        let roots = state_components(root, arity)?;
        let reduced = state_components(reduced, arity)?;
        let expanded = (0..arity)
            .map(|i| self.reducers[i].expanded_state(&roots[i], block, &reduced[i]))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositeState::new(expanded).into())
    }

    fn reduced_precision(&self, precision: &Precision, block: &Block) -> Result<Precision> {
        let precisions = precision_components(precision, self.reducers.len())?;
        let reduced = self
            .reducers
            .iter()
            .zip(precisions)
            .map(|(reducer, precision)| reducer.reduced_precision(precision, block))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositePrecision::new(reduced).into())
    }

    fn expanded_precision(
        &self,
        root_precision: &Precision,
        block: &Block,
        reduced_precision: &Precision,
    ) -> Result<Precision> {
        let arity = self.reducers.len();
        let roots = precision_components(root_precision, arity)?;
        let reduced = precision_components(reduced_precision, arity)?;
        let expanded = (0..arity)
            .map(|i| self.reducers[i].expanded_precision(&roots[i], block, &reduced[i]))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositePrecision::new(expanded).into())
    }

    fn state_key(&self, state: &AbstractState, precision: &Precision, block: &Block) -> u64 {
        let arity = self.reducers.len();
        let mut hasher = FxHasher::default();
        match (
            state_components(state, arity),
            precision_components(precision, arity),
        ) {
            (Ok(states), Ok(precisions)) => {
                for i in 0..arity {
                    self.reducers[i]
                        .state_key(&states[i], &precisions[i], block)
                        .hash(&mut hasher);
                }
            }
            _ => state.hash(&mut hasher),
        }
        hasher.finish()
    }
}
