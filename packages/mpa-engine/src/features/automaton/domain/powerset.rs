/*
 * Powerset Automaton State
 *
 * One abstract value standing for several automaton-state branches. The
 * distinguished TOP value is the most general powerset: it contains
 * "at least" any number of states and is equal only to itself.
 */

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::errors::{MpaError, Result};
use crate::shared::models::PropertySet;

use super::automaton::Assumption;
use super::state::AutomatonState;

static TOP: Lazy<PowersetAutomatonState> = Lazy::new(|| PowersetAutomatonState {
    states: Arc::new(BTreeSet::new()),
    top: true,
});

#[derive(Debug, Clone)]
pub struct PowersetAutomatonState {
    states: Arc<BTreeSet<AutomatonState>>,
    top: bool,
}

impl PowersetAutomatonState {
    pub fn new(states: impl IntoIterator<Item = AutomatonState>) -> Self {
        Self {
            states: Arc::new(states.into_iter().collect()),
            top: false,
        }
    }

    pub fn singleton(state: AutomatonState) -> Self {
        Self::new(std::iter::once(state))
    }

    /// The shared TOP value
    pub fn top() -> Self {
        TOP.clone()
    }

    pub fn is_top(&self) -> bool {
        self.top
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.top && self.states.is_empty()
    }

    /// TOP contains at least any number of states
    pub fn contains_at_least(&self, count: usize) -> bool {
        self.top || self.states.len() >= count
    }

    pub fn contains(&self, state: &AutomatonState) -> bool {
        self.top || self.states.contains(state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AutomatonState> {
        self.states.iter()
    }

    /// `self ⊆ other`
    pub fn is_subset_of(&self, other: &PowersetAutomatonState) -> bool {
        if other.top {
            return true;
        }
        !self.top && self.states.is_subset(&other.states)
    }

    pub fn union(&self, other: &PowersetAutomatonState) -> PowersetAutomatonState {
        if self.top || other.top {
            return Self::top();
        }
        if other.is_subset_of(self) {
            return self.clone();
        }
        Self::new(self.states.iter().chain(other.states.iter()).cloned())
    }

    pub fn is_target(&self) -> bool {
        self.states.iter().any(AutomatonState::is_target)
    }

    /// Union of the violated properties of all target members.
    ///
    /// # Errors
    /// `MpaError::Usage` if no member is a target.
    pub fn violated_properties(&self) -> Result<PropertySet> {
        if !self.is_target() {
            return Err(MpaError::usage(
                "violated properties requested from a non-target powerset state",
            ));
        }
        let mut result = PropertySet::new();
        for state in self.states.iter().filter(|s| s.is_target()) {
            result.extend(state.violated_properties()?);
        }
        Ok(result)
    }

    /// Assumptions of all members
    pub fn assumptions(&self) -> Vec<Assumption> {
        let mut result: Vec<Assumption> = self
            .states
            .iter()
            .flat_map(|s| s.assumptions().iter().cloned())
            .collect();
        result.sort();
        result.dedup();
        result
    }
}

impl PartialEq for PowersetAutomatonState {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.states, &other.states) {
            return self.top == other.top;
        }
        if self.top || other.top {
            return false;
        }
        self.states == other.states
    }
}

impl Eq for PowersetAutomatonState {}

impl Hash for PowersetAutomatonState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.top.hash(state);
        if !self.top {
            self.states.hash(state);
        }
    }
}

impl fmt::Display for PowersetAutomatonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.top {
            return f.write_str("TOP");
        }
        let members: Vec<String> = self.states.iter().map(|s| s.to_string()).collect();
        write!(f, "{{{}}}", members.join(", "))
    }
}
