/*
 * Composite Operators
 *
 * Positional lifting of component operators to product states. Every
 * operator checks the arity of its inputs against the number of components
 * it was built with.
 */

mod domain;
mod merge;
mod precision_adjustment;
mod proof;
mod reducer;
mod stop;
mod transfer;

pub use domain::CompositeDomain;
pub use merge::{CompositeMergeAgreeOperator, CompositeMergePlainOperator};
pub use precision_adjustment::{CompositePrecisionAdjustment, CompositeSimplePrecisionAdjustment};
pub use proof::CompositeProofChecker;
pub use reducer::CompositeReducer;
pub use stop::CompositeStopOperator;
pub use transfer::CompositeTransferRelation;

use crate::errors::{MpaError, Result};
use crate::features::cpa::domain::{AbstractState, Precision};

/// Components of a composite state with `arity` components
pub(crate) fn state_components(state: &AbstractState, arity: usize) -> Result<&[AbstractState]> {
    let composite = state.as_composite().ok_or_else(|| {
        MpaError::invalid_analysis(format!(
            "composite operator received a {} state",
            state.kind_name()
        ))
    })?;
    MpaError::check_arity(arity, composite.len())?;
    Ok(composite.components())
}

/// Components of a composite precision with `arity` components
pub(crate) fn precision_components(precision: &Precision, arity: usize) -> Result<&[Precision]> {
    let composite = precision.as_composite().ok_or_else(|| {
        MpaError::invalid_analysis("composite operator received a non-composite precision")
    })?;
    MpaError::check_arity(arity, composite.len())?;
    Ok(composite.components())
}
