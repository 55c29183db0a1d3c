/*
 * Automaton State
 *
 * Position of one property automaton: the internal state plus the subset
 * of its leaving transitions that is still relevant under the current
 * precision. Values are immutable; narrowing the relevant set produces a
 * new state.
 */

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::{MpaError, Result};
use crate::shared::models::PropertySet;

use super::automaton::{
    Assumption, Automaton, AutomatonId, AutomatonTransition, InternalStateId, StateKind,
    TransitionId,
};

#[derive(Debug, Clone)]
pub struct AutomatonState {
    automaton: Arc<Automaton>,
    internal: InternalStateId,
    relevant: Arc<[TransitionId]>,
    assumptions: Arc<[Assumption]>,
    violated: Arc<PropertySet>,
}

impl AutomatonState {
    /// Initial state, all transitions relevant
    pub fn initial(automaton: Arc<Automaton>) -> Self {
        let internal = automaton.initial_state();
        Self::at(automaton, internal, Vec::new(), PropertySet::new())
    }

    /// State at `internal` with all leaving transitions relevant
    pub fn at(
        automaton: Arc<Automaton>,
        internal: InternalStateId,
        assumptions: Vec<Assumption>,
        violated: PropertySet,
    ) -> Self {
        let relevant = automaton.leaving(internal).clone();
        Self {
            automaton,
            internal,
            relevant,
            assumptions: Arc::from(assumptions),
            violated: Arc::new(violated),
        }
    }

    /// Same position with a different relevant-transition set
    pub fn with_relevant_transitions(&self, relevant: Arc<[TransitionId]>) -> Self {
        Self {
            automaton: self.automaton.clone(),
            internal: self.internal,
            relevant,
            assumptions: self.assumptions.clone(),
            violated: self.violated.clone(),
        }
    }

    /// Same position without assumptions (used when no transition fires)
    pub fn without_assumptions(&self) -> Self {
        if self.assumptions.is_empty() {
            return self.clone();
        }
        Self {
            assumptions: Arc::from(Vec::new()),
            ..self.clone()
        }
    }

    pub fn automaton(&self) -> &Arc<Automaton> {
        &self.automaton
    }

    pub fn internal_state(&self) -> InternalStateId {
        self.internal
    }

    pub fn internal_state_name(&self) -> &str {
        &self.automaton.state(self.internal).name
    }

    pub fn kind(&self) -> StateKind {
        self.automaton.state(self.internal).kind
    }

    pub fn is_target(&self) -> bool {
        self.kind() == StateKind::Target
    }

    pub fn is_inactive(&self) -> bool {
        self.kind().is_inactive()
    }

    pub fn is_bottom(&self) -> bool {
        self.kind() == StateKind::Bottom
    }

    /// Relevant transitions under the current precision
    pub fn relevant_transitions(&self) -> &Arc<[TransitionId]> {
        &self.relevant
    }

    /// All leaving transitions of the internal state
    pub fn leaving_transitions(&self) -> &Arc<[TransitionId]> {
        self.automaton.leaving(self.internal)
    }

    pub fn relevant_transition_iter(&self) -> impl Iterator<Item = &AutomatonTransition> {
        self.relevant.iter().map(|t| self.automaton.transition(*t))
    }

    pub fn assumptions(&self) -> &[Assumption] {
        &self.assumptions
    }

    /// Properties violated at this state.
    ///
    /// # Errors
    /// `MpaError::Usage` if the state is not a target.
    pub fn violated_properties(&self) -> Result<PropertySet> {
        if !self.is_target() {
            return Err(MpaError::usage(format!(
                "violated properties requested from non-target automaton state {}",
                self
            )));
        }
        Ok((*self.violated).clone())
    }

    fn key(&self) -> (AutomatonId, InternalStateId) {
        (self.automaton.id(), self.internal)
    }
}

impl PartialEq for AutomatonState {
    fn eq(&self, other: &Self) -> bool {
        self.automaton.id() == other.automaton.id()
            && self.internal == other.internal
            && self.relevant == other.relevant
            && self.assumptions == other.assumptions
            && self.violated == other.violated
    }
}

impl Eq for AutomatonState {}

impl Hash for AutomatonState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.automaton.id().hash(state);
        self.internal.hash(state);
        self.relevant.hash(state);
        self.assumptions.hash(state);
        self.violated.hash(state);
    }
}

impl PartialOrd for AutomatonState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AutomatonState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then_with(|| self.relevant.cmp(&other.relevant))
            .then_with(|| self.assumptions.cmp(&other.assumptions))
            .then_with(|| self.violated.cmp(&other.violated))
    }
}

impl fmt::Display for AutomatonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.automaton.name(), self.internal_state_name())?;
        for assumption in self.assumptions.iter() {
            write!(f, " {}", assumption)?;
        }
        Ok(())
    }
}
