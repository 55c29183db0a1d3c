/*
 * Composite Domain Models
 */

mod state;

pub use state::{CompositePrecision, CompositeState};
