/*
 * Automaton Precision Adjustment
 *
 * Narrows the relevant-transition set of an automaton state to the
 * transitions not fully blacklisted by the precision. Results are memoized
 * per (automaton, internal state, precision); the table lives as long as
 * the analysis instance or until `clear_cache`.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::errors::{MpaError, Result};
use crate::features::automaton::domain::{
    AutomatonId, AutomatonPrecision, AutomatonState, InternalStateId, TransitionId,
};
use crate::features::cpa::domain::{AbstractState, Precision, PrecisionAdjustmentResult};
use crate::features::cpa::ports::PrecisionAdjustment;
use crate::features::reachability::domain::ReachedSet;

use super::transfer::automaton_precision;

type MemoKey = (AutomatonId, InternalStateId, AutomatonPrecision);

pub struct AutomatonPrecisionAdjustment {
    adjust_transitions: bool,
    memo: Mutex<FxHashMap<MemoKey, Arc<[TransitionId]>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AutomatonPrecisionAdjustment {
    pub fn new(adjust_transitions: bool) -> Self {
        Self {
            adjust_transitions,
            memo: Mutex::new(FxHashMap::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Leaving transitions of `state` that are relevant under `precision`
    pub fn relevant_transitions(
        &self,
        state: &AutomatonState,
        precision: &AutomatonPrecision,
    ) -> Arc<[TransitionId]> {
        let key = (
            state.automaton().id(),
            state.internal_state(),
            precision.clone(),
        );
        if let Some(cached) = self.memo.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let leaving = state.leaving_transitions();
        let relevant: Arc<[TransitionId]> = if state.is_inactive() {
            leaving.clone()
        } else {
            let automaton = state.automaton();
            let kept: Vec<TransitionId> = leaving
                .iter()
                .copied()
                .filter(|t| !precision.are_blacklisted(&automaton.transition(*t).properties))
                .collect();
            if kept.len() == leaving.len() {
                leaving.clone()
            } else {
                Arc::from(kept)
            }
        };

        self.memo.lock().insert(key, relevant.clone());
        relevant
    }

    /// Adjusted state and whether it differs from `state`
    pub fn adjust(
        &self,
        state: &AutomatonState,
        precision: &AutomatonPrecision,
    ) -> (AutomatonState, bool) {
        let relevant = self.relevant_transitions(state, precision);
        if !self.adjust_transitions || relevant[..] == state.relevant_transitions()[..] {
            return (state.clone(), false);
        }
        (state.with_relevant_transitions(relevant), true)
    }

    pub fn clear_cache(&self) {
        self.memo.lock().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.memo.lock().len()
    }

    /// (hits, misses) of the memo table
    pub fn cache_stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

impl PrecisionAdjustment for AutomatonPrecisionAdjustment {
    fn prec(
        &self,
        state: &AbstractState,
        precision: &Precision,
        _reached: &ReachedSet,
        _full_state: &AbstractState,
    ) -> Result<Option<PrecisionAdjustmentResult>> {
        let automaton_state = state.as_automaton().ok_or_else(|| {
            MpaError::invalid_analysis(format!(
                "automaton precision adjustment received a {} state",
                state.kind_name()
            ))
        })?;
        let automaton_prec = automaton_precision(precision)?;

        let (adjusted, changed) = self.adjust(automaton_state, &automaton_prec);
        Ok(Some(if changed {
            PrecisionAdjustmentResult::changed(adjusted.into(), precision.clone())
        } else {
            PrecisionAdjustmentResult::unchanged(state.clone(), precision.clone())
        }))
    }
}
