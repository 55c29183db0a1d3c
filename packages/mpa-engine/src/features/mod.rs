//! Feature modules, leaf to root:
//! cpa → automaton, composite → reachability → mpa

pub mod automaton;
pub mod composite;
pub mod cpa;
pub mod mpa;
pub mod reachability;
