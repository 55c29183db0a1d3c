/*
 * Abstract States
 *
 * The closed set of state kinds an analysis can produce. Composite states
 * nest other abstract states positionally; automaton and powerset states
 * carry the property-tracking information; opaque values come from
 * component analyses plugged in from outside.
 *
 * Every variant is an immutable value: cloning is cheap (Arc-backed), and
 * "changing" a state always means building a new one.
 */

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::{MpaError, Result};
use crate::features::automaton::domain::{AutomatonState, PowersetAutomatonState};
use crate::features::composite::domain::CompositeState;
use crate::shared::models::{NodeId, PropertySet};

/// Abstract state of any analysis in the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbstractState {
    /// Program location
    Location(LocationState),
    /// Position of one property automaton
    Automaton(AutomatonState),
    /// Set of automaton positions
    Powerset(PowersetAutomatonState),
    /// Product of component states
    Composite(CompositeState),
    /// Opaque value of a plugged-in component
    Value(ValueState),
}

impl AbstractState {
    /// Location of this state, if it (or a composite component) has one
    pub fn location(&self) -> Option<NodeId> {
        match self {
            AbstractState::Location(l) => Some(l.node),
            AbstractState::Composite(c) => c.components().iter().find_map(|s| s.location()),
            _ => None,
        }
    }

    pub fn is_target(&self) -> bool {
        match self {
            AbstractState::Automaton(s) => s.is_target(),
            AbstractState::Powerset(p) => p.is_target(),
            AbstractState::Composite(c) => c.components().iter().any(|s| s.is_target()),
            AbstractState::Location(_) | AbstractState::Value(_) => false,
        }
    }

    /// Properties violated at this state.
    ///
    /// # Errors
    /// `MpaError::Usage` if the state is not a target.
    pub fn violated_properties(&self) -> Result<PropertySet> {
        if !self.is_target() {
            return Err(MpaError::usage(
                "violated properties requested from a non-target state",
            ));
        }
        let mut result = PropertySet::new();
        self.collect_violated(&mut result)?;
        Ok(result)
    }

    fn collect_violated(&self, into: &mut PropertySet) -> Result<()> {
        match self {
            AbstractState::Automaton(s) if s.is_target() => {
                into.extend(s.violated_properties()?);
            }
            AbstractState::Powerset(p) if p.is_target() => {
                into.extend(p.violated_properties()?);
            }
            AbstractState::Composite(c) => {
                for component in c.components().iter() {
                    component.collect_violated(into)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// All automaton states in this state (powerset members included)
    pub fn automaton_states(&self) -> Vec<&AutomatonState> {
        let mut result = Vec::new();
        self.collect_automaton_states(&mut result);
        result
    }

    fn collect_automaton_states<'a>(&'a self, into: &mut Vec<&'a AutomatonState>) {
        match self {
            AbstractState::Automaton(s) => into.push(s),
            AbstractState::Powerset(p) => into.extend(p.iter()),
            AbstractState::Composite(c) => {
                for component in c.components().iter() {
                    component.collect_automaton_states(into);
                }
            }
            _ => {}
        }
    }

    /// Properties encoded by the automata tracked in this state
    pub fn encoded_properties(&self) -> PropertySet {
        self.automaton_states()
            .into_iter()
            .flat_map(|s| s.automaton().properties().iter().cloned())
            .collect()
    }

    pub fn as_composite(&self) -> Option<&CompositeState> {
        match self {
            AbstractState::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_automaton(&self) -> Option<&AutomatonState> {
        match self {
            AbstractState::Automaton(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_powerset(&self) -> Option<&PowersetAutomatonState> {
        match self {
            AbstractState::Powerset(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&ValueState> {
        match self {
            AbstractState::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Short kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            AbstractState::Location(_) => "location",
            AbstractState::Automaton(_) => "automaton",
            AbstractState::Powerset(_) => "powerset",
            AbstractState::Composite(_) => "composite",
            AbstractState::Value(_) => "value",
        }
    }
}

impl From<LocationState> for AbstractState {
    fn from(state: LocationState) -> Self {
        AbstractState::Location(state)
    }
}

impl From<AutomatonState> for AbstractState {
    fn from(state: AutomatonState) -> Self {
        AbstractState::Automaton(state)
    }
}

impl From<PowersetAutomatonState> for AbstractState {
    fn from(state: PowersetAutomatonState) -> Self {
        AbstractState::Powerset(state)
    }
}

impl From<CompositeState> for AbstractState {
    fn from(state: CompositeState) -> Self {
        AbstractState::Composite(state)
    }
}

impl From<ValueState> for AbstractState {
    fn from(state: ValueState) -> Self {
        AbstractState::Value(state)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Location
// ═══════════════════════════════════════════════════════════════════════════

/// Current program location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationState {
    pub node: NodeId,
}

impl LocationState {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Opaque component values
// ═══════════════════════════════════════════════════════════════════════════

/// Object-safe equality/hash for component values.
///
/// Implemented for every `Debug + Eq + Hash` type, so a plugged-in domain
/// only has to derive those traits.
pub trait DynValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynValue) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T> DynValue for T
where
    T: Any + fmt::Debug + Eq + Hash + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| other == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Opaque abstract value of a plugged-in component analysis
#[derive(Debug, Clone)]
pub struct ValueState {
    value: Arc<dyn DynValue>,
}

impl ValueState {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Debug + Eq + Hash + Send + Sync,
    {
        Self {
            value: Arc::new(value),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).as_any().downcast_ref::<T>()
    }
}

impl PartialEq for ValueState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value) || (*self.value).dyn_eq(&*other.value)
    }
}

impl Eq for ValueState {}

impl Hash for ValueState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.value).dyn_hash(state);
    }
}
