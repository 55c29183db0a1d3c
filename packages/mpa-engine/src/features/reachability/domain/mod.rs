/*
 * Reachability Domain Models
 */

mod reached_set;

pub use reached_set::{ReachedSet, StateId};
