/*
 * Automaton Domain Models
 *
 * Property automata, their states and precisions.
 */

mod automaton;
mod powerset;
mod precision;
mod state;

pub use automaton::{
    Assumption, Automaton, AutomatonBuilder, AutomatonId, AutomatonTransition, EdgeMatcher,
    InternalState, InternalStateId, StateKind, TransitionId, TransitionSpec, INACTIVE_STATE,
    INTERMEDIATE_INACTIVE_STATE,
};
pub use powerset::PowersetAutomatonState;
pub use precision::AutomatonPrecision;
pub use state::AutomatonState;
