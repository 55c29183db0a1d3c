/*
 * Reachability Application Layer
 */

mod cpa_algorithm;

pub use cpa_algorithm::CpaAlgorithm;
