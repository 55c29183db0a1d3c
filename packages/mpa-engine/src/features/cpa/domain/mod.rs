/*
 * Analysis Domain Models
 *
 * States, precisions and the values exchanged between the operators of a
 * configurable program analysis.
 */

mod adjustment;
mod block;
mod precision;
mod state;

pub use adjustment::{Action, PrecisionAdjustmentResult};
pub use block::Block;
pub use precision::Precision;
pub use state::{AbstractState, DynValue, LocationState, ValueState};
