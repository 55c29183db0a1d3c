/*
 * Composite Analysis Factory
 *
 * Builds the analysis of one partition run from scratch:
 *   [location] + plugged-in components + one tracker per property automaton
 * wrapped in a composite analysis, a CPA driver over it and an empty
 * reached set. Nothing is reused between runs.
 */

use std::sync::Arc;

use tracing::debug;

use crate::config::{AutomatonConfig, CompositeConfig, DriverConfig, MpaConfig};
use crate::errors::{MpaError, Result};
use crate::features::automaton::application::{AutomatonAnalysis, PowersetAutomatonAnalysis};
use crate::features::automaton::domain::Automaton;
use crate::features::composite::application::CompositeAnalysis;
use crate::features::cpa::infrastructure::LocationAnalysis;
use crate::features::cpa::ports::ConfigurableProgramAnalysis;
use crate::features::mpa::domain::StatsHandle;
use crate::features::mpa::ports::{AnalysisFactory, PartitionAnalysis};
use crate::features::reachability::application::CpaAlgorithm;
use crate::features::reachability::domain::ReachedSet;
use crate::shared::interrupt::ShutdownNotifier;
use crate::shared::models::Cfa;

/// Creates a fresh instance of a plugged-in component analysis
pub type ComponentBuilder =
    Arc<dyn Fn() -> Result<Arc<dyn ConfigurableProgramAnalysis>> + Send + Sync>;

pub struct CompositeAnalysisFactory {
    cfa: Arc<Cfa>,
    automata: Vec<Arc<Automaton>>,
    components: Vec<ComponentBuilder>,
    powerset: bool,
    composite: CompositeConfig,
    automaton: AutomatonConfig,
    driver: DriverConfig,
}

impl CompositeAnalysisFactory {
    pub fn new(cfa: Arc<Cfa>, automata: Vec<Automaton>, config: &MpaConfig) -> Self {
        Self {
            cfa,
            automata: automata.into_iter().map(Arc::new).collect(),
            components: Vec::new(),
            powerset: false,
            composite: config.composite.clone(),
            automaton: config.automaton.clone(),
            driver: config.driver.clone(),
        }
    }

    /// Add a component analysis between the location and the automata
    pub fn with_component<F>(mut self, builder: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ConfigurableProgramAnalysis>> + Send + Sync + 'static,
    {
        self.components.push(Arc::new(builder));
        self
    }

    /// Track each automaton with a powerset state instead of a single state
    pub fn with_powerset_automata(mut self) -> Self {
        self.powerset = true;
        self
    }

    pub fn cfa(&self) -> &Arc<Cfa> {
        &self.cfa
    }

    pub fn automata(&self) -> &[Arc<Automaton>] {
        &self.automata
    }

    fn tracker(
        &self,
        automaton: &Arc<Automaton>,
        stats: &StatsHandle,
    ) -> Arc<dyn ConfigurableProgramAnalysis> {
        if self.powerset {
            Arc::new(PowersetAutomatonAnalysis::new(
                automaton.clone(),
                &self.automaton,
                stats.clone(),
            ))
        } else {
            Arc::new(AutomatonAnalysis::new(
                automaton.clone(),
                &self.automaton,
                stats.clone(),
            ))
        }
    }
}

impl AnalysisFactory for CompositeAnalysisFactory {
    fn create_fresh(
        &self,
        stats: &StatsHandle,
        shutdown: &ShutdownNotifier,
    ) -> Result<PartitionAnalysis> {
        if self.automata.is_empty() {
            return Err(MpaError::invalid_analysis(
                "at least one property automaton is required",
            ));
        }

        let mut components: Vec<Arc<dyn ConfigurableProgramAnalysis>> =
            Vec::with_capacity(1 + self.components.len() + self.automata.len());
        components.push(Arc::new(LocationAnalysis::new()));
        for builder in &self.components {
            components.push(builder()?);
        }
        for automaton in &self.automata {
            components.push(self.tracker(automaton, stats));
        }

        let composite = CompositeAnalysis::new(components, &self.composite)?;
        let driver = CpaAlgorithm::new(
            self.cfa.clone(),
            &composite,
            self.driver.clone(),
            shutdown.clone(),
        );
        debug!(
            components = composite.len(),
            powerset = self.powerset,
            "fresh partition analysis"
        );

        Ok(PartitionAnalysis {
            analysis: Arc::new(composite),
            driver: Box::new(driver),
            reached: ReachedSet::new(self.driver.waitlist_order),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automaton::infrastructure::LockAutomaton;
    use crate::features::cpa::infrastructure::testing::SetAnalysis;
    use crate::features::mpa::domain::new_stats_handle;
    use crate::shared::models::property_set;

    fn cfa() -> Arc<Cfa> {
        Arc::new(Cfa::builder("main").build())
    }

    #[test]
    fn test_fresh_analysis_layout() {
        let factory = CompositeAnalysisFactory::new(
            cfa(),
            vec![LockAutomaton::define().unwrap()],
            &MpaConfig::default(),
        )
        .with_component(|| {
            Ok(Arc::new(SetAnalysis::joining()) as Arc<dyn ConfigurableProgramAnalysis>)
        });

        let fresh = factory
            .create_fresh(&new_stats_handle(), &ShutdownNotifier::new())
            .unwrap();
        assert!(fresh.analysis.name().starts_with("CompositeAnalysis["));
        assert!(fresh.reached.is_empty());
        assert_eq!(
            fresh.analysis.encoded_properties(),
            property_set(["double_lock", "double_unlock"])
        );

        let entry = factory.cfa().entry();
        let state = fresh.analysis.initial_state(entry).unwrap();
        assert_eq!(state.as_composite().unwrap().len(), 3);
        assert_eq!(state.location(), Some(entry));
    }

    #[test]
    fn test_each_call_is_fresh() {
        let factory = CompositeAnalysisFactory::new(
            cfa(),
            vec![LockAutomaton::define().unwrap()],
            &MpaConfig::default(),
        );
        let stats = new_stats_handle();
        let a = factory.create_fresh(&stats, &ShutdownNotifier::new()).unwrap();
        let b = factory.create_fresh(&stats, &ShutdownNotifier::new()).unwrap();
        assert!(!Arc::ptr_eq(&a.analysis, &b.analysis));
    }

    #[test]
    fn test_powerset_trackers() {
        let factory = CompositeAnalysisFactory::new(
            cfa(),
            vec![LockAutomaton::define().unwrap()],
            &MpaConfig::default(),
        )
        .with_powerset_automata();
        let fresh = factory
            .create_fresh(&new_stats_handle(), &ShutdownNotifier::new())
            .unwrap();
        let state = fresh.analysis.initial_state(factory.cfa().entry()).unwrap();
        assert!(state.as_composite().unwrap().get(1).unwrap().as_powerset().is_some());
    }

    #[test]
    fn test_no_automata_rejected() {
        let factory = CompositeAnalysisFactory::new(cfa(), Vec::new(), &MpaConfig::default());
        assert!(matches!(
            factory.create_fresh(&new_stats_handle(), &ShutdownNotifier::new()),
            Err(MpaError::InvalidAnalysis(_))
        ));
    }
}
