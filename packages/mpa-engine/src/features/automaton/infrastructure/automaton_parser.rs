/*
 * Automaton Definition Parser
 *
 * Load property automata from YAML/JSON.
 *
 * # Schema
 * ```yaml
 * automaton: Locking
 * initial_state: Unlocked
 * properties: [double_lock, double_unlock]
 * states:
 *   - name: Unlocked
 *   - name: Locked
 *   - name: Error
 *     kind: target
 * transitions:
 *   - from: Unlocked
 *     matcher: { kind: call, function: lock }
 *     to: Locked
 *   - from: Locked
 *     matcher: { kind: call, function: lock }
 *     to: Error
 *     properties: [double_lock]
 *     assumptions:
 *       - { expression: "x > 0", truth: true }
 * ```
 *
 * # Validation
 * Delegated to `AutomatonBuilder::build`: declared states, a known initial
 * state, transition properties declared on the automaton, valid regexes.
 */

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, ConfigResult};
use crate::features::automaton::domain::{Automaton, EdgeMatcher, StateKind, TransitionSpec};

/// Automaton definition (YAML/JSON schema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutomatonDefinition {
    pub automaton: String,
    pub initial_state: String,

    /// Encoded properties (default: the automaton name)
    #[serde(default)]
    pub properties: Vec<String>,

    pub states: Vec<StateDefinition>,

    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDefinition {
    pub name: String,
    #[serde(default = "normal_kind")]
    pub kind: StateKind,
}

fn normal_kind() -> StateKind {
    StateKind::Normal
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionDefinition {
    pub from: String,
    pub matcher: MatcherDefinition,
    pub to: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub assumptions: Vec<AssumptionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssumptionDefinition {
    pub expression: String,
    #[serde(default = "default_truth")]
    pub truth: bool,
}

fn default_truth() -> bool {
    true
}

/// Edge matcher definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherDefinition {
    Any,
    Call { function: String },
    Label { pattern: String },
    Assume { pattern: String, truth: bool },
    Exit,
    Not { matcher: Box<MatcherDefinition> },
    All { matchers: Vec<MatcherDefinition> },
    AnyOf { matchers: Vec<MatcherDefinition> },
}

impl MatcherDefinition {
    pub fn to_matcher(&self) -> ConfigResult<EdgeMatcher> {
        Ok(match self {
            MatcherDefinition::Any => EdgeMatcher::Any,
            MatcherDefinition::Call { function } => EdgeMatcher::call(function.clone()),
            MatcherDefinition::Label { pattern } => EdgeMatcher::label(pattern)?,
            MatcherDefinition::Assume { pattern, truth } => EdgeMatcher::assume(pattern, *truth)?,
            MatcherDefinition::Exit => EdgeMatcher::ProgramExit,
            MatcherDefinition::Not { matcher } => matcher.to_matcher()?.negate(),
            MatcherDefinition::All { matchers } => EdgeMatcher::All(
                matchers
                    .iter()
                    .map(MatcherDefinition::to_matcher)
                    .collect::<ConfigResult<_>>()?,
            ),
            MatcherDefinition::AnyOf { matchers } => EdgeMatcher::AnyOf(
                matchers
                    .iter()
                    .map(MatcherDefinition::to_matcher)
                    .collect::<ConfigResult<_>>()?,
            ),
        })
    }
}

/// Several automata in one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AutomataDocument {
    automata: Vec<AutomatonDefinition>,
}

pub struct AutomatonParser;

impl AutomatonParser {
    pub fn from_yaml(yaml: &str) -> ConfigResult<Automaton> {
        let definition: AutomatonDefinition = serde_yaml::from_str(yaml)?;
        Self::build(&definition)
    }

    pub fn from_json(json: &str) -> ConfigResult<Automaton> {
        let definition: AutomatonDefinition = serde_json::from_str(json)?;
        Self::build(&definition)
    }

    /// Parse a document of the form `automata: [ ... ]`
    pub fn many_from_yaml(yaml: &str) -> ConfigResult<Vec<Automaton>> {
        let document: AutomataDocument = serde_yaml::from_str(yaml)?;
        document.automata.iter().map(Self::build).collect()
    }

    /// Load a file; `.json` is parsed as JSON, anything else as YAML.
    /// Both single definitions and `automata:` documents are accepted.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Vec<Automaton>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let automata = if is_json {
            match serde_json::from_str::<AutomataDocument>(&content) {
                Ok(document) => document.automata.iter().map(Self::build).collect(),
                Err(_) => Self::from_json(&content).map(|a| vec![a]),
            }
        } else if content.lines().any(|l| l.trim_start().starts_with("automata:")) {
            Self::many_from_yaml(&content)
        } else {
            Self::from_yaml(&content).map(|a| vec![a])
        }?;

        debug!(path = %path.display(), count = automata.len(), "loaded automata");
        Ok(automata)
    }

    pub fn build(definition: &AutomatonDefinition) -> ConfigResult<Automaton> {
        if definition.states.is_empty() {
            return Err(ConfigError::Custom(format!(
                "automaton '{}' declares no states",
                definition.automaton
            )));
        }

        let mut builder = Automaton::builder(&definition.automaton).initial(&definition.initial_state);
        for property in &definition.properties {
            builder = builder.property(property.as_str());
        }
        for state in &definition.states {
            builder = builder.state(&state.name, state.kind);
        }
        for transition in &definition.transitions {
            let mut spec = TransitionSpec::new(
                &transition.from,
                transition.matcher.to_matcher()?,
                &transition.to,
            );
            for property in &transition.properties {
                spec = spec.for_property(property.as_str());
            }
            for assumption in &transition.assumptions {
                spec = spec.assume(&assumption.expression, assumption.truth);
            }
            builder = builder.transition(spec);
        }
        builder.build()
    }
}
