/*
 * Default Init Operator
 *
 * Seeds a fresh reached set with the analysis' initial state at the CFA
 * entry. Every property outside the first batch is blacklisted in the seed
 * precision so the run only works for that batch.
 */

use tracing::debug;

use crate::errors::{MpaError, Result};
use crate::features::cpa::ports::ConfigurableProgramAnalysis;
use crate::features::mpa::domain::Partitioning;
use crate::features::mpa::ports::InitOperator;
use crate::features::reachability::domain::ReachedSet;
use crate::shared::models::{difference, format_set, Cfa, PropertySet};

#[derive(Debug, Default, Clone, Copy)]
pub struct InitDefaultOperator;

impl InitOperator for InitDefaultOperator {
    fn init(
        &self,
        all: &PropertySet,
        analysis: &dyn ConfigurableProgramAnalysis,
        reached: &mut ReachedSet,
        partitioning: &Partitioning,
        cfa: &Cfa,
    ) -> Result<Partitioning> {
        let first = partitioning.first_partition().ok_or_else(|| {
            MpaError::invariant("a non-empty set of properties must be checked in a run")
        })?;

        let state = analysis.initial_state(cfa.entry())?;
        let precision = analysis.initial_precision(cfa.entry())?;
        let blacklist = difference(all, first);
        debug!(
            checked = %format_set(first),
            blacklisted = blacklist.len(),
            "seeding reached set"
        );

        reached.clear();
        reached.add(state, precision.with_blacklisted(&blacklist));
        Ok(partitioning.without_first())
    }
}
