/*
 * Automaton Application Layer
 *
 * Component analyses over property automata.
 */

mod analysis;
mod powerset_analysis;
mod precision_adjustment;
mod transfer;

pub use analysis::AutomatonAnalysis;
pub use powerset_analysis::{
    PowersetAutomatonAnalysis, PowersetDomain, PowersetPrecisionAdjustment,
    PowersetTransferRelation,
};
pub use precision_adjustment::AutomatonPrecisionAdjustment;
pub use transfer::{new_budgeting_slot, AutomatonTransferRelation, BudgetingSlot};
