/*
 * Analysis Infrastructure
 *
 * Stock operators and the location analysis.
 */

mod location;
mod operators;

pub use location::{LocationAnalysis, LocationTransferRelation};
pub use operators::{
    EqualityDomain, MergeJoinOperator, MergeSepOperator, StaticPrecisionAdjustment,
    StopSepOperator,
};

#[cfg(test)]
pub(crate) mod testing;
