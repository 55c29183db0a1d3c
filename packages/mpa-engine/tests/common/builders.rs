//! Test data builders
//!
//! Controller assembly plus instrumented drivers and operators that the
//! scenario tests plug into the controller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use mpa_engine::features::mpa::{
    PartitionAnalysis, PartitioningError, RefinementOrder, StatsHandle,
};
use mpa_engine::shared::models::{difference, intersection};
use mpa_engine::{
    AnalysisFactory, Automaton, Cfa, CompositeAnalysisFactory, InterruptKind, MpaConfig,
    MpaError, MultiPropertyAnalysis, Partitioning, PartitioningOperator, PartitioningStatus,
    PropertySet, ReachabilityDriver, ReachedSet, Result, RunOutcome, ShutdownNotifier,
};

/// Builder for a controller over the default composite factory
pub struct ControllerBuilder {
    cfa: Arc<Cfa>,
    automata: Vec<Automaton>,
    config: MpaConfig,
}

impl ControllerBuilder {
    pub fn new(cfa: Arc<Cfa>, automata: Vec<Automaton>) -> Self {
        Self {
            cfa,
            automata,
            config: MpaConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MpaConfig) -> Self {
        self.config = config;
        self
    }

    /// Controller over the plain composite factory
    pub fn build(self) -> MultiPropertyAnalysis {
        let factory = CompositeAnalysisFactory::new(self.cfa.clone(), self.automata, &self.config);
        MultiPropertyAnalysis::new(self.cfa, Arc::new(factory), self.config.build().unwrap())
    }

    /// Controller over `wrap(default factory)`
    pub fn build_with<F>(self, wrap: F) -> MultiPropertyAnalysis
    where
        F: FnOnce(CompositeAnalysisFactory) -> Arc<dyn AnalysisFactory>,
    {
        let factory = CompositeAnalysisFactory::new(self.cfa.clone(), self.automata, &self.config);
        MultiPropertyAnalysis::new(self.cfa, wrap(factory), self.config.build().unwrap())
    }
}

/// Properties the next run of `reached` works for: encoded in the first
/// state and not blacklisted on it or on any waiting state
pub fn active_properties(reached: &ReachedSet) -> PropertySet {
    let Some(first) = reached.first_state() else {
        return PropertySet::new();
    };
    let (Some(state), Some(precision)) = (reached.state(first), reached.precision(first)) else {
        return PropertySet::new();
    };
    let mut active = difference(&state.encoded_properties(), &precision.blacklisted_properties());
    for id in reached.waitlist() {
        if let Some(precision) = reached.precision(id) {
            active = difference(&active, &precision.blacklisted_properties());
        }
    }
    active
}

// ============================================================================
// Spinning driver: never terminates for batches with a slow property
// ============================================================================

/// Factory whose driver spins until interrupted whenever the run checks
/// one of the `slow` properties
pub struct SpinOnPropertiesFactory {
    inner: CompositeAnalysisFactory,
    slow: PropertySet,
}

impl SpinOnPropertiesFactory {
    pub fn new(inner: CompositeAnalysisFactory, slow: PropertySet) -> Self {
        Self { inner, slow }
    }
}

impl AnalysisFactory for SpinOnPropertiesFactory {
    fn create_fresh(
        &self,
        stats: &StatsHandle,
        shutdown: &ShutdownNotifier,
    ) -> Result<PartitionAnalysis> {
        let mut fresh = self.inner.create_fresh(stats, shutdown)?;
        fresh.driver = Box::new(SpinDriver {
            inner: fresh.driver,
            slow: self.slow.clone(),
            shutdown: shutdown.clone(),
        });
        Ok(fresh)
    }
}

struct SpinDriver {
    inner: Box<dyn ReachabilityDriver>,
    slow: PropertySet,
    shutdown: ShutdownNotifier,
}

/// Upper bound so a broken limit checker fails the test instead of hanging it
const SPIN_TIMEOUT: Duration = Duration::from_secs(10);

impl ReachabilityDriver for SpinDriver {
    fn run(&self, reached: &mut ReachedSet) -> RunOutcome {
        if intersection(&active_properties(reached), &self.slow).is_empty() {
            return self.inner.run(reached);
        }
        let started = Instant::now();
        loop {
            match self.shutdown.requested() {
                Some(InterruptKind::ResourceLimit) => return RunOutcome::ResourceInterrupt,
                Some(InterruptKind::External) => return RunOutcome::ExternalShutdown,
                None => {}
            }
            if started.elapsed() > SPIN_TIMEOUT {
                return RunOutcome::Fatal(MpaError::invariant("no resource limit fired"));
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

// ============================================================================
// Recording driver: remembers the active properties of every run
// ============================================================================

pub type RunLog = Arc<Mutex<Vec<PropertySet>>>;

pub struct RecordingFactory {
    inner: CompositeAnalysisFactory,
    log: RunLog,
}

impl RecordingFactory {
    pub fn new(inner: CompositeAnalysisFactory) -> (Self, RunLog) {
        let log = RunLog::default();
        (
            Self {
                inner,
                log: log.clone(),
            },
            log,
        )
    }
}

impl AnalysisFactory for RecordingFactory {
    fn create_fresh(
        &self,
        stats: &StatsHandle,
        shutdown: &ShutdownNotifier,
    ) -> Result<PartitionAnalysis> {
        let mut fresh = self.inner.create_fresh(stats, shutdown)?;
        fresh.driver = Box::new(RecordingDriver {
            inner: fresh.driver,
            log: self.log.clone(),
        });
        Ok(fresh)
    }
}

struct RecordingDriver {
    inner: Box<dyn ReachabilityDriver>,
    log: RunLog,
}

impl ReachabilityDriver for RecordingDriver {
    fn run(&self, reached: &mut ReachedSet) -> RunOutcome {
        self.log.lock().push(active_properties(reached));
        self.inner.run(reached)
    }
}

// ============================================================================
// Fixed partitioning operator
// ============================================================================

/// Returns the same partitioning on the first call and `Break` afterwards
pub struct FixedPartitioningOperator {
    partitioning: Partitioning,
}

impl FixedPartitioningOperator {
    pub fn new(partitioning: Partitioning) -> Self {
        Self { partitioning }
    }
}

impl PartitioningOperator for FixedPartitioningOperator {
    fn name(&self) -> &str {
        "FixedPartitioningOperator"
    }

    fn partition(
        &self,
        last: &Partitioning,
        _to_check: &PropertySet,
        _disabled: &PropertySet,
        _order: &RefinementOrder,
    ) -> std::result::Result<Partitioning, PartitioningError> {
        if last.status() == PartitioningStatus::None {
            Ok(self.partitioning.clone())
        } else {
            Ok(last.to_break())
        }
    }
}
