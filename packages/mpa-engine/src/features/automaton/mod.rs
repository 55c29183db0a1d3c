/*
 * Property Automata
 *
 * Properties are encoded as automata that observe CFA edges. Reaching a
 * target state means the properties of the firing transition are violated.
 * The automaton precision blacklists properties; blacklisted transitions
 * drop out of the relevant set and fully blacklisted automata go inactive.
 *
 * Architecture:
 * - Domain: Automaton, AutomatonState, PowersetAutomatonState, AutomatonPrecision
 * - Application: AutomatonAnalysis, PowersetAutomatonAnalysis
 * - Infrastructure: AutomatonParser (YAML/JSON), built-in automata
 */

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{AutomatonAnalysis, PowersetAutomatonAnalysis};
pub use domain::{
    Assumption, Automaton, AutomatonBuilder, AutomatonPrecision, AutomatonState, EdgeMatcher,
    PowersetAutomatonState, StateKind, TransitionSpec,
};
pub use infrastructure::{
    AutomatonParser, FileAutomaton, ForbiddenCallAutomaton, LockAutomaton, MemoryAutomaton,
};
