/*
 * Property Automaton
 *
 * A finite automaton that observes CFA edges and moves to a target state
 * when a property is violated.
 *
 * # Example: Locking discipline
 * ```text
 * States: {Unlocked, Locked, Error(target)}
 * Transitions:
 *   Unlocked --lock()--> Locked
 *   Locked --unlock()--> Unlocked
 *   Locked --lock()--> Error     [double_lock]
 *   Unlocked --unlock()--> Error [unlock_without_lock]
 * ```
 *
 * States and transitions are stored in arenas and referred to by small
 * integer ids, so automaton states compare and hash in O(relevant
 * transitions) without touching names or matchers.
 *
 * Two inactive states are added to every automaton: INACTIVE (all
 * properties suppressed while at the initial state) and
 * INTERMEDIATE_INACTIVE (suppressed in the middle of a pattern).
 */

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult};
use crate::shared::models::{CfaEdge, EdgeKind, Property, PropertySet};

/// Name of the reserved inactive state
pub const INACTIVE_STATE: &str = "__INACTIVE";
/// Name of the reserved intermediate inactive state
pub const INTERMEDIATE_INACTIVE_STATE: &str = "__INTERMEDIATE_INACTIVE";

static NEXT_AUTOMATON_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of one automaton instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AutomatonId(u32);

/// Index of an internal state inside its automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InternalStateId(u32);

impl InternalStateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a transition inside its automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u32);

impl TransitionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Role of an internal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Normal,
    /// Property violation
    Target,
    /// Sink that prunes the path
    Bottom,
    /// All properties suppressed (reached from the initial state)
    Inactive,
    /// All properties suppressed (reached mid-pattern)
    IntermediateInactive,
}

impl StateKind {
    pub fn is_inactive(self) -> bool {
        matches!(self, StateKind::Inactive | StateKind::IntermediateInactive)
    }
}

/// Assumption emitted by a transition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assumption {
    pub expression: String,
    pub truth: bool,
}

impl Assumption {
    pub fn new(expression: impl Into<String>, truth: bool) -> Self {
        Self {
            expression: expression.into(),
            truth,
        }
    }
}

impl fmt::Display for Assumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.truth {
            write!(f, "[{}]", self.expression)
        } else {
            write!(f, "[!({})]", self.expression)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Edge matchers
// ═══════════════════════════════════════════════════════════════════════════

/// Guard of a transition over the current CFA edge
#[derive(Debug, Clone)]
pub enum EdgeMatcher {
    /// Every edge
    Any,
    /// Edge label matches the regex
    Label(Regex),
    /// Call of the named function
    FunctionCall(String),
    /// Assume edge whose condition matches, taken with the given truth value
    Assume { pattern: Regex, truth: bool },
    /// Edge into the program exit
    ProgramExit,
    Not(Box<EdgeMatcher>),
    All(Vec<EdgeMatcher>),
    AnyOf(Vec<EdgeMatcher>),
}

impl EdgeMatcher {
    pub fn label(pattern: &str) -> ConfigResult<Self> {
        Ok(EdgeMatcher::Label(compile(pattern)?))
    }

    pub fn call(function: impl Into<String>) -> Self {
        EdgeMatcher::FunctionCall(function.into())
    }

    pub fn assume(pattern: &str, truth: bool) -> ConfigResult<Self> {
        Ok(EdgeMatcher::Assume {
            pattern: compile(pattern)?,
            truth,
        })
    }

    pub fn negate(self) -> Self {
        EdgeMatcher::Not(Box::new(self))
    }

    pub fn matches(&self, edge: &CfaEdge) -> bool {
        match self {
            EdgeMatcher::Any => true,
            EdgeMatcher::Label(re) => re.is_match(&edge.label),
            EdgeMatcher::FunctionCall(name) => {
                matches!(&edge.kind, EdgeKind::FunctionCall { function } if function == name)
            }
            EdgeMatcher::Assume { pattern, truth } => match edge.kind {
                EdgeKind::Assume { truth: taken } => taken == *truth && pattern.is_match(&edge.label),
                _ => false,
            },
            EdgeMatcher::ProgramExit => edge.target_is_exit,
            EdgeMatcher::Not(inner) => !inner.matches(edge),
            EdgeMatcher::All(all) => all.iter().all(|m| m.matches(edge)),
            EdgeMatcher::AnyOf(any) => any.iter().any(|m| m.matches(edge)),
        }
    }
}

fn compile(pattern: &str) -> ConfigResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::Custom(format!("invalid edge pattern '{}': {}", pattern, e)))
}

// ═══════════════════════════════════════════════════════════════════════════
// Automaton
// ═══════════════════════════════════════════════════════════════════════════

/// Internal state of an automaton
#[derive(Debug, Clone)]
pub struct InternalState {
    pub name: String,
    pub kind: StateKind,
    /// All leaving transitions, in declaration order
    pub leaving: Arc<[TransitionId]>,
}

/// Transition between internal states
#[derive(Debug, Clone)]
pub struct AutomatonTransition {
    pub id: TransitionId,
    pub source: InternalStateId,
    pub matcher: EdgeMatcher,
    pub assumptions: Vec<Assumption>,
    pub follow: InternalStateId,
    /// Properties this transition is relevant to (empty: not tied to any)
    pub properties: PropertySet,
}

/// An immutable property automaton
#[derive(Debug)]
pub struct Automaton {
    id: AutomatonId,
    name: String,
    states: Vec<InternalState>,
    transitions: Vec<AutomatonTransition>,
    initial: InternalStateId,
    inactive: InternalStateId,
    intermediate_inactive: InternalStateId,
    properties: PropertySet,
}

impl Automaton {
    pub fn builder(name: impl Into<String>) -> AutomatonBuilder {
        AutomatonBuilder::new(name)
    }

    pub fn id(&self) -> AutomatonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties encoded by this automaton
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn initial_state(&self) -> InternalStateId {
        self.initial
    }

    pub fn inactive_state(&self) -> InternalStateId {
        self.inactive
    }

    pub fn intermediate_inactive_state(&self) -> InternalStateId {
        self.intermediate_inactive
    }

    pub fn state(&self, id: InternalStateId) -> &InternalState {
        &self.states[id.index()]
    }

    pub fn transition(&self, id: TransitionId) -> &AutomatonTransition {
        &self.transitions[id.index()]
    }

    pub fn leaving(&self, id: InternalStateId) -> &Arc<[TransitionId]> {
        &self.states[id.index()].leaving
    }

    pub fn state_by_name(&self, name: &str) -> Option<InternalStateId> {
        self.states
            .iter()
            .position(|s| s.name == name)
            .map(|i| InternalStateId(i as u32))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════

/// Transition declared by name, resolved by [`AutomatonBuilder::build`]
#[derive(Debug, Clone)]
pub struct TransitionSpec {
    pub from: String,
    pub to: String,
    pub matcher: EdgeMatcher,
    pub assumptions: Vec<Assumption>,
    pub properties: PropertySet,
}

impl TransitionSpec {
    pub fn new(from: impl Into<String>, matcher: EdgeMatcher, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            matcher,
            assumptions: Vec::new(),
            properties: PropertySet::new(),
        }
    }

    pub fn assume(mut self, expression: impl Into<String>, truth: bool) -> Self {
        self.assumptions.push(Assumption::new(expression, truth));
        self
    }

    pub fn for_property(mut self, property: impl Into<Property>) -> Self {
        self.properties.insert(property.into());
        self
    }
}

/// Builder for [`Automaton`]
///
/// # Example
/// ```ignore
/// let automaton = Automaton::builder("Locking")
///     .state("Unlocked", StateKind::Normal)
///     .state("Locked", StateKind::Normal)
///     .state("Error", StateKind::Target)
///     .initial("Unlocked")
///     .property("double_lock")
///     .transition(TransitionSpec::new("Unlocked", EdgeMatcher::call("lock"), "Locked"))
///     .transition(
///         TransitionSpec::new("Locked", EdgeMatcher::call("lock"), "Error")
///             .for_property("double_lock"),
///     )
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct AutomatonBuilder {
    name: String,
    states: Vec<(String, StateKind)>,
    initial: Option<String>,
    properties: PropertySet,
    transitions: Vec<TransitionSpec>,
}

impl AutomatonBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            initial: None,
            properties: PropertySet::new(),
            transitions: Vec::new(),
        }
    }

    pub fn state(mut self, name: impl Into<String>, kind: StateKind) -> Self {
        self.states.push((name.into(), kind));
        self
    }

    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    pub fn property(mut self, property: impl Into<Property>) -> Self {
        self.properties.insert(property.into());
        self
    }

    pub fn transition(mut self, spec: TransitionSpec) -> Self {
        self.transitions.push(spec);
        self
    }

    pub fn build(self) -> ConfigResult<Automaton> {
        let mut names: Vec<String> = Vec::with_capacity(self.states.len() + 2);
        let mut kinds: Vec<StateKind> = Vec::with_capacity(self.states.len() + 2);
        let mut index: FxHashMap<String, InternalStateId> = FxHashMap::default();

        for (name, kind) in &self.states {
            if kind.is_inactive() {
                return Err(ConfigError::Custom(format!(
                    "state '{}' of automaton '{}': inactive states are managed by the engine",
                    name, self.name
                )));
            }
            if index.contains_key(name) {
                return Err(ConfigError::Custom(format!(
                    "state '{}' declared twice in automaton '{}'",
                    name, self.name
                )));
            }
            index.insert(name.clone(), InternalStateId(names.len() as u32));
            names.push(name.clone());
            kinds.push(*kind);
        }

        let declared: Vec<String> = names.clone();
        let lookup = |name: &str| -> ConfigResult<InternalStateId> {
            index.get(name).copied().ok_or_else(|| {
                ConfigError::unknown_name_with_suggestion("state", name, &self.name, &declared)
            })
        };

        let initial_name = self.initial.as_deref().ok_or_else(|| {
            ConfigError::Custom(format!("automaton '{}' has no initial state", self.name))
        })?;
        let initial = lookup(initial_name)?;

        // Encoded properties default to the automaton name.
        let mut properties = self.properties.clone();
        if properties.is_empty() {
            properties.insert(Property::new(&self.name));
        }

        let mut transitions = Vec::with_capacity(self.transitions.len());
        let mut leaving: Vec<Vec<TransitionId>> = vec![Vec::new(); names.len() + 2];
        for spec in &self.transitions {
            let source = lookup(&spec.from)?;
            let follow = lookup(&spec.to)?;
            if let Some(unknown) = spec.properties.iter().find(|p| !properties.contains(*p)) {
                let candidates: Vec<String> =
                    properties.iter().map(|p| p.name().to_string()).collect();
                return Err(ConfigError::unknown_name_with_suggestion(
                    "property",
                    unknown.name(),
                    &self.name,
                    &candidates,
                ));
            }
            let id = TransitionId(transitions.len() as u32);
            leaving[source.index()].push(id);
            transitions.push(AutomatonTransition {
                id,
                source,
                matcher: spec.matcher.clone(),
                assumptions: spec.assumptions.clone(),
                follow,
                properties: spec.properties.clone(),
            });
        }

        let inactive = InternalStateId(names.len() as u32);
        names.push(INACTIVE_STATE.to_string());
        kinds.push(StateKind::Inactive);
        let intermediate_inactive = InternalStateId(names.len() as u32);
        names.push(INTERMEDIATE_INACTIVE_STATE.to_string());
        kinds.push(StateKind::IntermediateInactive);

        let states = names
            .into_iter()
            .zip(kinds)
            .zip(leaving)
            .map(|((name, kind), leaving)| InternalState {
                name,
                kind,
                leaving: Arc::from(leaving),
            })
            .collect();

        Ok(Automaton {
            id: AutomatonId(NEXT_AUTOMATON_ID.fetch_add(1, Ordering::Relaxed)),
            name: self.name,
            states,
            transitions,
            initial,
            inactive,
            intermediate_inactive,
            properties,
        })
    }
}
