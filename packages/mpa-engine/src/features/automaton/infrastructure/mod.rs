/*
 * Automaton Infrastructure
 *
 * Built-in automata and the definition parser.
 */

mod automaton_parser;
mod built_in;

pub use automaton_parser::{
    AssumptionDefinition, AutomatonDefinition, AutomatonParser, MatcherDefinition,
    StateDefinition, TransitionDefinition,
};
pub use built_in::{FileAutomaton, ForbiddenCallAutomaton, LockAutomaton, MemoryAutomaton};
