/*
 * Multi-Property Analysis
 *
 * Partition/restart controller. Checks every property encoded in the seed
 * state by running the reachability driver once per property batch:
 *
 *   partition → fresh analysis + reached set → resource limits → run
 *     target      → record violation, blacklist it on the waitlist, continue
 *     fixpoint    → batch properties satisfied
 *     exhausted   → singleton batch becomes unknown, repartition
 *     shutdown    → abort
 *
 * Soundness: a property is only satisfied after a genuine fixpoint of a run
 * that checked it; everything else that was considered ends up unknown.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{ConfigError, MpaConfig, ValidatedConfig};
use crate::errors::{MpaError, Result};
use crate::features::mpa::domain::{
    new_stats_handle, DecompositionStatistics, Partitioning, PartitioningStatus, PropertySummary,
    StatsHandle,
};
use crate::features::mpa::infrastructure::{
    partitioning_operator_from_config, InitDefaultOperator, ResourceLimit, ResourceLimitChecker,
};
use crate::features::mpa::ports::{
    AnalysisFactory, InitOperator, PartitionAnalysis, PartitioningOperator, StatisticsSink,
};
use crate::features::reachability::domain::ReachedSet;
use crate::features::reachability::ports::{AlgorithmStatus, RunOutcome};
use crate::shared::interrupt::ShutdownNotifier;
use crate::shared::models::{difference, format_set, intersection, Cfa, PropertySet};

/// Property sets of one controller invocation
#[derive(Debug, Default)]
struct Verdicts {
    all: PropertySet,
    relevant: PropertySet,
    violated: PropertySet,
    satisfied: PropertySet,
    /// Properties given up on; still part of `remaining`
    unknown: PropertySet,
}

impl Verdicts {
    fn remaining(&self) -> PropertySet {
        self.all
            .iter()
            .filter(|p| !self.violated.contains(*p) && !self.satisfied.contains(*p))
            .cloned()
            .collect()
    }

    fn settled(&self) -> PropertySet {
        self.violated
            .iter()
            .chain(&self.satisfied)
            .chain(&self.unknown)
            .cloned()
            .collect()
    }
}

pub struct MultiPropertyAnalysis {
    cfa: Arc<Cfa>,
    config: MpaConfig,
    factory: Arc<dyn AnalysisFactory>,
    partitioner: Arc<dyn PartitioningOperator>,
    init: Arc<dyn InitOperator>,
    shutdown: ShutdownNotifier,
    stats: StatsHandle,
    sink: Option<Arc<dyn StatisticsSink>>,
    statistics: DecompositionStatistics,
    current: Option<PartitionAnalysis>,
    checker: ResourceLimitChecker,
    last_summary: Option<PropertySummary>,
    last_status: Option<AlgorithmStatus>,
}

impl MultiPropertyAnalysis {
    pub fn new(cfa: Arc<Cfa>, factory: Arc<dyn AnalysisFactory>, config: ValidatedConfig) -> Self {
        let config = config.into_inner();
        let partitioner =
            partitioning_operator_from_config(config.partitioning.operator, &config.budget);
        Self {
            cfa,
            config,
            factory,
            partitioner,
            init: Arc::new(InitDefaultOperator),
            shutdown: ShutdownNotifier::new(),
            stats: new_stats_handle(),
            sink: None,
            statistics: DecompositionStatistics::default(),
            current: None,
            checker: ResourceLimitChecker::inactive(),
            last_summary: None,
            last_status: None,
        }
    }

    pub fn with_partitioning_operator(mut self, operator: Arc<dyn PartitioningOperator>) -> Self {
        self.partitioner = operator;
        self
    }

    pub fn with_init_operator(mut self, operator: Arc<dyn InitOperator>) -> Self {
        self.init = operator;
        self
    }

    /// Share an externally owned notifier (e.g. wired to a signal handler)
    pub fn with_shutdown_notifier(mut self, shutdown: ShutdownNotifier) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_statistics_sink(mut self, sink: Arc<dyn StatisticsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn shutdown_notifier(&self) -> &ShutdownNotifier {
        &self.shutdown
    }

    pub fn statistics(&self) -> &DecompositionStatistics {
        &self.statistics
    }

    pub fn property_stats(&self) -> &StatsHandle {
        &self.stats
    }

    /// Summary of the last `run`, also after a failed run
    pub fn last_summary(&self) -> Option<&PropertySummary> {
        self.last_summary.as_ref()
    }

    pub fn last_status(&self) -> Option<AlgorithmStatus> {
        self.last_status
    }

    /// Reached set holding the initial state of a fresh analysis
    pub fn seed(&self) -> Result<ReachedSet> {
        let fresh = self.factory.create_fresh(&self.stats, &self.shutdown)?;
        let entry = self.cfa.entry();
        let mut reached = fresh.reached;
        reached.add(
            fresh.analysis.initial_state(entry)?,
            fresh.analysis.initial_precision(entry)?,
        );
        Ok(reached)
    }

    /// Check every property active in the single state of `initial`
    ///
    /// # Errors
    /// - `MpaError::Usage` if `initial` does not hold exactly one waiting state
    /// - `MpaError::Config` if there is nothing to check or a partitioning
    ///   with several batches lacks a time limit
    /// - `MpaError::Shutdown` on external shutdown
    /// - `MpaError::InvariantViolation` if a soundness check fails
    pub fn run(&mut self, initial: &ReachedSet) -> Result<PropertySummary> {
        let mut verdicts = Verdicts::default();
        let result = self.run_loop(initial, &mut verdicts);
        self.checker.cancel();

        let summary = PropertySummary::new(
            verdicts.all,
            verdicts.relevant,
            verdicts.violated,
            verdicts.satisfied,
        );
        self.last_summary = summary.as_ref().ok().cloned();
        let status = result?;
        let summary = summary?;

        self.last_status = Some(status);
        if let Some(sink) = &self.sink {
            sink.report(&summary, &self.statistics);
        }
        Ok(summary)
    }

    fn run_loop(&mut self, initial: &ReachedSet, v: &mut Verdicts) -> Result<AlgorithmStatus> {
        if initial.len() != 1 || initial.waitlist_len() != 1 {
            return Err(MpaError::usage(format!(
                "the initial reached set must hold exactly one waiting state, found {} states and {} waiting",
                initial.len(),
                initial.waitlist_len()
            )));
        }
        v.all = initial_properties(initial)?;
        if v.all.is_empty() {
            return Err(MpaError::Config(ConfigError::conflict(
                "no property is active in the initial state",
                "add a property automaton or remove properties from the initial blacklist",
            )));
        }
        info!("Checking {} properties.", v.all.len());

        self.stats.lock().clear();
        self.statistics = DecompositionStatistics::default();
        let mut status = AlgorithmStatus::sound_and_precise();

        let mut check = self.partition(&Partitioning::none(), &v.all, &PropertySet::new())?;
        let mut last = check.clone();
        let mut carried = self.init_analysis(&check, &v.all)?;
        self.start_limit_checker(&check)?;

        loop {
            let run_properties = self.run_properties()?;
            self.statistics.iterations += 1;

            let started = Instant::now();
            let outcome = {
                let current = self.current_mut()?;
                current
                    .analysis
                    .set_property_budgeting(check.property_budgeting().clone());
                current.driver.run(&mut current.reached)
            };
            self.statistics.pure_analysis_time += started.elapsed();

            {
                let stats = self.stats.lock();
                v.relevant.extend(stats.relevant().iter().cloned());
                if run_properties.len() == 1 {
                    v.unknown.extend(intersection(stats.disabled(), &run_properties));
                }
            }

            let mut interrupted = false;
            match outcome {
                RunOutcome::Finished(run_status) => status = status.and(run_status),
                RunOutcome::ResourceInterrupt => {
                    interrupted = true;
                    self.shutdown.reset_temporary();
                    warn!(
                        properties = %format_set(&run_properties),
                        "Resource limit for properties exceeded"
                    );
                    self.checker.cancel();
                    self.statistics.partition_exhaustions += 1;
                    if run_properties.len() == 1 {
                        v.unknown.extend(difference(&run_properties, &v.violated));
                    }
                }
                RunOutcome::ExternalShutdown => {
                    let reason = self
                        .shutdown
                        .reason()
                        .unwrap_or_else(|| "shutdown requested".to_string());
                    warn!(reason = %reason, "Multi-property analysis shut down");
                    return Err(MpaError::Shutdown(reason));
                }
                RunOutcome::Fatal(e) => return Err(e),
            }

            let run_violated = if interrupted {
                PropertySet::new()
            } else {
                self.violations_in_run()?
            };

            if !run_violated.is_empty() {
                let reached = &mut self.current_mut()?.reached;
                if !reached.has_waiting_state() {
                    return Err(MpaError::invariant(
                        "target state reached with an empty waitlist, later violations cannot be ruled out",
                    ));
                }
                v.violated.extend(run_violated.iter().cloned());
                info!(violated = %format_set(&run_violated), "Property violation found");

                let blacklist = v.violated.clone();
                reached.update_waitlist_precisions(|p| p.with_blacklisted(&blacklist));
            } else {
                let (size, waiting) = {
                    let reached = &self.current_mut()?.reached;
                    (reached.len(), reached.has_waiting_state())
                };

                if !waiting && !interrupted {
                    let disabled = self.stats.lock().disabled().clone();
                    let proven = difference(&difference(&run_properties, &v.violated), &disabled);
                    v.satisfied.extend(proven.iter().cloned());
                    info!(
                        "Fixpoint with {} states reached for: {}. {} properties remain to be checked.",
                        size,
                        format_set(&proven),
                        v.remaining().len()
                    );
                    self.check_fixpoint_size(size)?;
                    self.statistics.reached_states_with_fixpoint.push(size);
                    if !intersection(&v.relevant, &run_properties).is_empty() {
                        self.statistics
                            .reached_states_for_relevant_with_fixpoint
                            .push(size);
                    }
                } else {
                    self.statistics.reached_states_without_fixpoint.push(size);
                }

                let remain = v.remaining();
                if remain.is_empty() {
                    break;
                }

                let still_carried = carried.subtract(&v.settled());
                check = if still_carried.is_empty() {
                    self.statistics.partition_adjustments += 1;
                    let mut disabled = self.stats.lock().disabled().clone();
                    disabled.extend(v.unknown.iter().cloned());
                    info!(
                        all = %format_set(&v.all),
                        disabled = %format_set(&disabled),
                        satisfied = %format_set(&v.satisfied),
                        violated = %format_set(&v.violated),
                        "Adjusting property partitions"
                    );
                    match self.partition(&last, &remain, &disabled) {
                        Ok(next) => {
                            last = next.clone();
                            self.stats.lock().clear();
                            next
                        }
                        Err(MpaError::Partitioning(reason)) => {
                            info!(reason = %reason, "No further partitioning");
                            break;
                        }
                        Err(e) => return Err(e),
                    }
                } else {
                    still_carried
                };

                if check.status() == PartitioningStatus::Break || check.is_empty() {
                    break;
                }
                if let Some(max) = self.config.partitioning.max_restarts {
                    if self.statistics.restarts >= max {
                        warn!(max_restarts = max, "Restart limit reached");
                        break;
                    }
                }

                self.statistics.restarts += 1;
                carried = self.init_analysis(&check, &v.all)?;
                self.start_limit_checker(&check)?;
            }

            // Everything considered is resolved: further exploration cannot
            // change the summary.
            if v.remaining().is_empty() {
                break;
            }
            let waiting = self
                .current
                .as_ref()
                .map_or(false, |c| c.reached.has_waiting_state());
            if !waiting {
                break;
            }
        }

        let unknown = v.remaining().len();
        info!(
            "Multi-property analysis terminated: {} violated, {} satisfied, {} unknown",
            v.violated.len(),
            v.satisfied.len(),
            unknown
        );
        if unknown > 0 {
            warn!(unknown = %format_set(&v.remaining()), "Properties left without verdict");
        }
        Ok(status)
    }

    fn current_mut(&mut self) -> Result<&mut PartitionAnalysis> {
        self.current
            .as_mut()
            .ok_or_else(|| MpaError::invariant("no partition analysis initialized"))
    }

    /// Properties the current run works for: encoded in the first state,
    /// not blacklisted on the seed or any waiting state, not disabled
    fn run_properties(&self) -> Result<PropertySet> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| MpaError::invariant("no partition analysis initialized"))?;
        let reached = &current.reached;
        let mut active = initial_properties(reached)?;
        for id in reached.waitlist() {
            if let Some(precision) = reached.precision(id) {
                active = difference(&active, &precision.blacklisted_properties());
            }
        }
        Ok(difference(&active, self.stats.lock().disabled()))
    }

    fn violations_in_run(&self) -> Result<PropertySet> {
        let Some(current) = self.current.as_ref() else {
            return Ok(PropertySet::new());
        };
        let reached = &current.reached;
        match reached.last_state().and_then(|id| reached.state(id)) {
            Some(state) if state.is_target() => state.violated_properties(),
            _ => Ok(PropertySet::new()),
        }
    }

    fn partition(
        &self,
        last: &Partitioning,
        to_check: &PropertySet,
        disabled: &PropertySet,
    ) -> Result<Partitioning> {
        let order = self.stats.lock().refinement_order();
        let result = self.partitioner.partition(last, to_check, disabled, &order)?;

        info!(
            operator = self.partitioner.name(),
            status = %result.status(),
            "New partitioning with {} partitions.",
            result.partition_count()
        );
        for (nth, partition) in result.iter().enumerate() {
            info!(
                "Partition {} with {} elements: {}",
                nth + 1,
                partition.len(),
                format_set(partition)
            );
        }

        let unlimited = result.unlimited_partition_sizes();
        if !unlimited.is_empty() {
            return Err(MpaError::Config(ConfigError::conflict(
                format!(
                    "partitioning into {} partitions has no time limit for partitions of size {:?}",
                    result.partition_count(),
                    unlimited
                ),
                "set a partition (and single-property) CPU or wall time limit in the budget section",
            )));
        }
        Ok(result)
    }

    /// Full reset: fresh analysis, fresh reached set seeded for the first
    /// batch of `check`; returns the batches carried over
    fn init_analysis(&mut self, check: &Partitioning, all: &PropertySet) -> Result<Partitioning> {
        if check.is_empty() {
            return Err(MpaError::invariant(
                "a non-empty set of properties must be checked in a run",
            ));
        }
        if let Some(previous) = self.current.take() {
            if self.config.partitioning.clear_caches_on_restart {
                previous.analysis.clear_caches();
            }
        }

        let mut fresh = self.factory.create_fresh(&self.stats, &self.shutdown)?;
        self.stats.lock().reset_for_new_run();
        let carried = self.init.init(
            all,
            fresh.analysis.as_ref(),
            &mut fresh.reached,
            check,
            &self.cfa,
        )?;

        info!("{} states in reached.", fresh.reached.len());
        info!("{} states in waitlist.", fresh.reached.waitlist_len());
        let inactive: PropertySet = match fresh.reached.first_state() {
            Some(id) => fresh
                .reached
                .precision(id)
                .map(|p| intersection(&p.blacklisted_properties(), all))
                .unwrap_or_default(),
            None => PropertySet::new(),
        };
        info!("Waitlist with {} inactive properties.", inactive.len());
        for property in &inactive {
            debug!("INACTIVE: {}", property);
        }

        self.current = Some(fresh);
        Ok(carried)
    }

    /// Replace the running checker with one for the first batch of `check`
    fn start_limit_checker(&mut self, check: &Partitioning) -> Result<()> {
        self.checker.cancel();
        // a limit may have fired between the end of the last run and the cancel
        self.shutdown.reset_temporary();

        let size = check.first_partition().map_or(0, PropertySet::len);
        let limits = ResourceLimit::for_partition(check.partition_budgeting().as_ref(), size)?;
        debug!(limits = limits.len(), size, "starting resource limit checker");
        self.checker = ResourceLimitChecker::start(
            limits,
            self.shutdown.clone(),
            Duration::from_millis(self.config.budget.limit_check_interval_ms),
        )?;
        Ok(())
    }

    fn check_fixpoint_size(&self, size: usize) -> Result<()> {
        let floor = self.config.sanity.min_fixpoint_states;
        if size >= floor {
            return Ok(());
        }
        if self.config.sanity.strict {
            Err(MpaError::invariant(format!(
                "fixpoint with only {} states (minimum {})",
                size, floor
            )))
        } else {
            warn!(
                states = size,
                minimum = floor,
                "The set reached has too few states for a correct analysis run"
            );
            Ok(())
        }
    }
}

/// Properties encoded in the first state of `reached` minus those
/// blacklisted in its precision
fn initial_properties(reached: &ReachedSet) -> Result<PropertySet> {
    let id = reached
        .first_state()
        .ok_or_else(|| MpaError::usage("the reached set is empty"))?;
    match (reached.state(id), reached.precision(id)) {
        (Some(state), Some(precision)) => Ok(difference(
            &state.encoded_properties(),
            &precision.blacklisted_properties(),
        )),
        _ => Err(MpaError::usage("the first reached state was removed")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PartitionOperatorKind, Preset};
    use crate::features::automaton::infrastructure::{FileAutomaton, LockAutomaton};
    use crate::features::mpa::application::CompositeAnalysisFactory;
    use crate::features::mpa::domain::VerificationResult;
    use crate::shared::models::property_set;
    use pretty_assertions::assert_eq;

    /// lock(); unlock(); lock(); lock();  with a padding chain so fixpoints
    /// clear the sanity floor
    fn double_lock_program() -> Arc<Cfa> {
        let mut b = Cfa::builder("main");
        let entry = b.entry();
        let padded = b.chain(entry, (0..10).map(|i| format!("x = {};", i)));
        let n1 = b.add_node();
        let n2 = b.add_node();
        let n3 = b.add_node();
        let n4 = b.add_node();
        b.call(padded, n1, "lock");
        b.call(n1, n2, "unlock");
        b.call(n2, n3, "lock");
        b.call(n3, n4, "lock");
        b.mark_exit(n4);
        Arc::new(b.build())
    }

    fn controller(cfa: Arc<Cfa>, config: MpaConfig) -> MultiPropertyAnalysis {
        let factory = CompositeAnalysisFactory::new(
            cfa.clone(),
            vec![LockAutomaton::define().unwrap(), FileAutomaton::define().unwrap()],
            &config,
        );
        MultiPropertyAnalysis::new(cfa, Arc::new(factory), config.build().unwrap())
    }

    #[test]
    fn test_single_run_finds_violation_and_proves_rest() {
        let mut mpa = controller(double_lock_program(), MpaConfig::preset(Preset::SingleRun));
        let seed = mpa.seed().unwrap();
        let summary = mpa.run(&seed).unwrap();

        assert_eq!(summary.violated(), &property_set(["double_lock"]));
        assert_eq!(
            summary.satisfied(),
            &property_set(["double_unlock", "close_unopened", "use_after_close"])
        );
        assert!(summary.unknown().is_empty());
        assert_eq!(summary.verdict(), VerificationResult::False);
        assert_eq!(mpa.statistics().restarts, 0);
        assert!(mpa.last_status().unwrap().sound);
    }

    #[test]
    fn test_one_for_each_restarts_per_property() {
        let config = MpaConfig::preset(Preset::PerProperty);
        let mut mpa = controller(double_lock_program(), config);
        let seed = mpa.seed().unwrap();
        let summary = mpa.run(&seed).unwrap();

        assert_eq!(summary.violated(), &property_set(["double_lock"]));
        assert_eq!(summary.satisfied().len(), 3);
        assert_eq!(mpa.statistics().restarts, 3);
        assert_eq!(mpa.statistics().reached_states_with_fixpoint.len(), 4);
    }

    #[test]
    fn test_multiple_partitions_without_limit_rejected() {
        let config = MpaConfig::preset(Preset::SingleRun)
            .partitioning(|p| p.operator(PartitionOperatorKind::OneForEach));
        let mut mpa = controller(double_lock_program(), config);
        let seed = mpa.seed().unwrap();

        let err = mpa.run(&seed).unwrap_err();
        assert!(matches!(err, MpaError::Config(_)));
        assert_eq!(mpa.statistics().iterations, 0);
        let summary = mpa.last_summary().unwrap();
        assert_eq!(summary.unknown().len(), 4);
    }

    #[test]
    fn test_seed_must_be_single_state() {
        let mut mpa = controller(double_lock_program(), MpaConfig::preset(Preset::SingleRun));
        let mut seed = mpa.seed().unwrap();
        let id = seed.first_state().unwrap();
        let state = seed.state(id).unwrap().clone();
        let precision = seed.precision(id).unwrap().clone();
        seed.add(state, precision);

        assert!(matches!(mpa.run(&seed), Err(MpaError::Usage(_))));
    }

    #[test]
    fn test_fully_blacklisted_seed_rejected() {
        let mut mpa = controller(double_lock_program(), MpaConfig::preset(Preset::SingleRun));
        let mut seed = mpa.seed().unwrap();
        let id = seed.first_state().unwrap();
        let everything = property_set([
            "double_lock",
            "double_unlock",
            "close_unopened",
            "use_after_close",
        ]);
        seed.update_precision(id, seed.precision(id).unwrap().with_blacklisted(&everything))
            .unwrap();

        assert!(matches!(mpa.run(&seed), Err(MpaError::Config(_))));
    }

    #[test]
    fn test_strict_sanity_floor() {
        let mut b = Cfa::builder("main");
        let entry = b.entry();
        let next = b.add_node();
        b.statement(entry, next, "x = 1;");
        let cfa = Arc::new(b.build());

        let lenient = MpaConfig::preset(Preset::SingleRun);
        let mut mpa = controller(cfa.clone(), lenient);
        let seed = mpa.seed().unwrap();
        assert_eq!(mpa.run(&seed).unwrap().satisfied().len(), 4);

        let strict = MpaConfig::preset(Preset::SingleRun).sanity(|s| s.strict(true));
        let mut mpa = controller(cfa, strict);
        let seed = mpa.seed().unwrap();
        assert!(matches!(mpa.run(&seed), Err(MpaError::InvariantViolation(_))));
    }

    #[test]
    fn test_external_shutdown_is_fatal() {
        let mut mpa = controller(double_lock_program(), MpaConfig::preset(Preset::SingleRun));
        mpa.shutdown_notifier().request_external("user abort");
        let seed = mpa.seed().unwrap();

        match mpa.run(&seed) {
            Err(MpaError::Shutdown(reason)) => assert_eq!(reason, "user abort"),
            other => panic!("expected shutdown, got {:?}", other.map(|s| s.verdict())),
        }
        assert!(mpa.last_summary().unwrap().satisfied().is_empty());
    }
}
