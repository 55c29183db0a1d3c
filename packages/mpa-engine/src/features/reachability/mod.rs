/*
 * Reachability
 *
 * Reached set with waitlist, and the reference CPA worklist driver.
 *
 * Architecture:
 * - Domain: ReachedSet, StateId
 * - Ports: ReachabilityDriver, RunOutcome, AlgorithmStatus
 * - Application: CpaAlgorithm
 */

pub mod application;
pub mod domain;
pub mod ports;

pub use application::CpaAlgorithm;
pub use domain::{ReachedSet, StateId};
pub use ports::{AlgorithmStatus, ReachabilityDriver, RunOutcome};
