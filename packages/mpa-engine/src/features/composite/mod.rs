/*
 * Composite Algebra
 *
 * N component analyses behaving as one: positional join/order, agree or
 * plain merge, conjunctive coverage, strongest-wins precision adjustment,
 * all-or-nothing reducer, and a proof checker re-deriving successors.
 *
 * Architecture:
 * - Domain: CompositeState, CompositePrecision
 * - Infrastructure: the composite operators
 * - Application: CompositeAnalysis (operator selection and assembly)
 */

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::CompositeAnalysis;
pub use domain::{CompositePrecision, CompositeState};
